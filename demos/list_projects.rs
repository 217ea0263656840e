//! List every project known to a Charon instance.
//!
//! Run:
//! `CHARON_API_TOKEN=<token> CHARON_BASE_URL=<url> cargo run --example list_projects`

use charon_client::{Session, construct_address};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = match Session::from_env() {
        Ok(session) => session,
        Err(error) => {
            eprintln!("{error}");
            eprintln!("Set CHARON_API_TOKEN and CHARON_BASE_URL before running this example.");
            std::process::exit(2);
        }
    };

    println!(
        "Querying {}",
        construct_address(session.config().base_url(), &[&"projects"])
    );
    let response = session.projects_get_all()?;
    let projects: serde_json::Value = response.json()?;
    println!("{}", serde_json::to_string_pretty(&projects)?);
    Ok(())
}
