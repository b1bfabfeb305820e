//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured people database (in memory by default).
//! - Run one save/find/count/delete pass through the generic repository.
//! - Print deterministic `key=value` lines for quick sanity checks.

use chrono::{FixedOffset, TimeZone};
use peopledb_core::db::open_with_config;
use peopledb_core::{init_from_config, CoreConfig, Person, PersonMapper, RepoError};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<RepoError>()
                .map_or("cli_failed", RepoError::code);
            log::error!("event=cli_run module=cli status=error error_code={code}");
            eprintln!("peopledb error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_from_config(&config.logging)?;

    println!("peopledb_core version={}", peopledb_core::core_version());

    let conn = open_with_config(&config.database)?;
    let repo = PersonMapper::repository(&conn)?;
    let baseline = repo.count()?;

    let dob = FixedOffset::west_opt(6 * 3600)
        .and_then(|offset| offset.with_ymd_and_hms(1980, 11, 15, 15, 0, 0).single())
        .ok_or("invalid sample date of birth")?;
    let mut person = Person::new("john", "smith", dob);
    repo.save(&mut person)?;
    let id = person.id.ok_or("save returned without an identity")?;
    println!("saved id={id}");

    let found = repo.find_by_id(id)?;
    println!("found matches={}", found.as_ref() == Some(&person));
    println!("count before={baseline} after_save={}", repo.count()?);

    repo.delete(&person)?;
    println!("count after_delete={}", repo.count()?);
    Ok(())
}
