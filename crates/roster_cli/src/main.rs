//! Roster CLI entry point.
//!
//! # Responsibility
//! - Run the fixed person-store sequences (full CRUD exercise, id listing)
//!   against the database named by the environment.
//! - Keep strict step ordering: every call completes before the next starts.
//!
//! # Invariants
//! - Connection/configuration failures are fatal and exit non-zero.
//! - A failing step is reported and the run continues to the next step.
//! - Not-found outcomes are expected, non-fatal results, not failures.

use log::{error, info, warn};
use roster_core::db::{open_db, open_db_in_memory, DbResult};
use roster_core::{
    default_log_level, init_logging, FavoriteFoodQuery, NewPerson, Person, PersonId,
    PersonService, RepoError, SqlitePersonRepository, StoreConfig,
};
use rusqlite::Connection;
use std::process::ExitCode;
use uuid::Uuid;

enum Mode {
    Exercise,
    ListIds,
}

fn main() -> ExitCode {
    let mode = match parse_mode() {
        Ok(mode) => mode,
        Err(unknown) => {
            eprintln!("unknown mode `{unknown}`; expected `exercise` or `list-ids`");
            return ExitCode::FAILURE;
        }
    };

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("file logging disabled: {err}");
        }
    }

    let conn = match open_store(&config) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to connect to store `{}`: {err}", config.database);
            return ExitCode::FAILURE;
        }
    };

    let repo = match SqlitePersonRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            error!("event=run module=cli status=error error={err}");
            eprintln!("store is not usable: {err}");
            return ExitCode::FAILURE;
        }
    };
    let service = PersonService::new(repo);

    let failed_steps = match mode {
        Mode::Exercise => run_exercise(&service),
        Mode::ListIds => run_list_ids(&service),
    };

    if failed_steps > 0 {
        eprintln!("{failed_steps} step(s) failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
    // The connection drops here, releasing the store on the normal exit path.
}

fn parse_mode() -> Result<Mode, String> {
    match std::env::args().nth(1).as_deref() {
        None | Some("exercise") => Ok(Mode::Exercise),
        Some("list-ids") => Ok(Mode::ListIds),
        Some(other) => Err(other.to_string()),
    }
}

fn open_store(config: &StoreConfig) -> DbResult<Connection> {
    if config.is_in_memory() {
        open_db_in_memory()
    } else {
        open_db(&config.database)
    }
}

/// Runs the fixed CRUD sequence: reset, inserts, finds, updates, deletes,
/// chained query. Returns the number of failed steps.
fn run_exercise(service: &PersonService<SqlitePersonRepository<'_>>) -> usize {
    info!("event=run module=cli status=start mode=exercise");
    let mut failed = 0;

    match service.delete_all() {
        Ok(count) => println!("reset: cleared {count} record(s)"),
        Err(err) => failed += count_step_failure("reset", &err),
    }

    let mut first_id: Option<PersonId> = None;
    let mut asmaa = NewPerson::new("Asmaa");
    asmaa.age = Some(28);
    asmaa.favorite_foods = vec!["couscous".to_string(), "tajine".to_string()];
    match service.insert_one(&asmaa) {
        Ok(person) => {
            println!("saved {} with id {}", person.name, person.id);
            first_id = Some(person.id);
        }
        Err(err) => failed += count_step_failure("insert-one", &err),
    }

    match service.insert_many(&fixture_people()) {
        Ok(people) => println!("created {} people", people.len()),
        Err(err) => failed += count_step_failure("insert-many", &err),
    }

    match service.find_by_name("Alice") {
        Ok(people) => {
            println!("found {} record(s) named Alice", people.len());
            for person in &people {
                print_person(person);
            }
        }
        Err(err) => failed += count_step_failure("find-by-name", &err),
    }

    match service.find_one_by_favorite_food("pizza") {
        Ok(Some(person)) => println!("first pizza lover: {}", person.name),
        Ok(None) => println!("nobody lists pizza"),
        Err(err) => failed += count_step_failure("find-one-by-food", &err),
    }

    // Fall back to a fresh id when the earlier insert failed; the append then
    // reports not-found instead of being skipped.
    let edit_id = first_id.unwrap_or_else(Uuid::new_v4);
    match service.append_favorite_food_if_absent(edit_id, "hamburger") {
        Ok(person) => println!(
            "{} now likes: {}",
            person.name,
            person.favorite_foods.join(", ")
        ),
        Err(err) => failed += count_step_failure("append-food", &err),
    }

    match service.set_age_by_name("Charlie", 20) {
        Ok(person) => println!("{} is now {:?} years old", person.name, person.age),
        Err(err) => failed += count_step_failure("set-age", &err),
    }

    // Deliberately targets an id that cannot resolve; the reported not-found
    // is the expected outcome and must not fail the run.
    match service.delete_by_id(Uuid::new_v4()) {
        Ok(person) => println!("removed {}", person.name),
        Err(err) => failed += count_step_failure("delete-by-id", &err),
    }

    match service.delete_all_by_name("Mary") {
        Ok(count) => println!("removed {count} record(s) named Mary"),
        Err(err) => failed += count_step_failure("delete-by-name", &err),
    }

    let query = FavoriteFoodQuery {
        sort_by_name: true,
        limit: Some(2),
        exclude_age: true,
    };
    match service.query_favorite_food("burritos", &query) {
        Ok(people) => {
            println!("burrito lovers (sorted, capped at 2, age hidden):");
            for person in &people {
                print_person(person);
            }
        }
        Err(err) => failed += count_step_failure("query-food", &err),
    }

    info!("event=run module=cli status=done mode=exercise failed_steps={failed}");
    failed
}

/// Prints `name - id` for every stored record. Returns failed step count.
fn run_list_ids(service: &PersonService<SqlitePersonRepository<'_>>) -> usize {
    info!("event=run module=cli status=start mode=list_ids");

    match service.list_people() {
        Ok(people) => {
            for person in &people {
                println!("{} - {}", person.name, person.id);
            }
            println!("{} record(s) total", people.len());
            0
        }
        Err(err) => count_step_failure("list-ids", &err),
    }
}

/// Reports a step error and returns 1 when it counts as a failure.
///
/// Not-found outcomes are reported but expected; they keep the exit code
/// clean. Every other error marks the run as failed, while later steps still
/// execute.
fn count_step_failure(step: &str, err: &RepoError) -> usize {
    match err {
        RepoError::NotFound(_) | RepoError::NameNotFound(_) => {
            warn!("event=step module=cli status=not_found step={step} detail={err}");
            println!("{step}: {err}");
            0
        }
        other => {
            error!("event=step module=cli status=error step={step} error={other}");
            eprintln!("{step}: {other}");
            1
        }
    }
}

fn print_person(person: &Person) {
    match person.age {
        Some(age) => println!(
            "  {} ({}), likes {}",
            person.name,
            age,
            person.favorite_foods.join(", ")
        ),
        None => println!("  {}, likes {}", person.name, person.favorite_foods.join(", ")),
    }
}

fn fixture_people() -> Vec<NewPerson> {
    let entries: [(&str, u32, &[&str]); 6] = [
        ("Alice", 25, &["salad", "pasta"]),
        ("Bob", 30, &["pizza", "ice cream"]),
        ("Charlie", 35, &["sushi", "ramen"]),
        ("Mary", 27, &["pasta", "chocolate"]),
        ("BurritoFan1", 40, &["burritos", "pizza"]),
        ("BurritoFan2", 22, &["burritos", "ice cream"]),
    ];

    entries
        .into_iter()
        .map(|(name, age, foods)| {
            let mut draft = NewPerson::new(name);
            draft.age = Some(age);
            draft.favorite_foods = foods.iter().map(|food| food.to_string()).collect();
            draft
        })
        .collect()
}
