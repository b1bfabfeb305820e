use chrono::Utc;
use peopledb_core::db::open_db_in_memory;
use peopledb_core::{flush_logs, init_logging, Person, PersonMapper, RepoError};
use std::fs;
use std::path::Path;

const SECRET_SALARY: &str = "SECRET-SALARY-99";

#[test]
fn failed_read_logs_error_code_without_row_contents() {
    let dir = tempfile::tempdir().unwrap();
    init_logging("info", dir.path().to_str().unwrap()).unwrap();

    let conn = open_db_in_memory().unwrap();
    let repo = PersonMapper::repository(&conn).unwrap();
    let mut person = Person::new("john", "smith", Utc::now().fixed_offset());
    repo.save(&mut person).unwrap();
    conn.execute(
        "UPDATE people SET salary = ?1 WHERE id = ?2",
        rusqlite::params![SECRET_SALARY, person.id.unwrap()],
    )
    .unwrap();

    let err = repo.find_by_id(person.id.unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(!err.to_string().contains(SECRET_SALARY));

    flush_logs();
    let logged = read_all_logs(dir.path());
    assert!(logged.contains("op=find_by_id"));
    assert!(logged.contains("error_code=invalid_data"));
    assert!(!logged.contains(SECRET_SALARY));
}

fn read_all_logs(dir: &Path) -> String {
    let mut logged = String::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_file() {
            logged.push_str(&fs::read_to_string(&path).unwrap());
        }
    }
    logged
}
