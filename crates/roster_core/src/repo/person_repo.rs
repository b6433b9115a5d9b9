//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the canonical `people` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must validate records before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Ids are assigned on insert and never reassigned.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::person::{NewPerson, Person, PersonId, PersonValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    age,
    favorite_foods
FROM people";

const FOOD_FILTER_SQL: &str =
    "EXISTS (SELECT 1 FROM json_each(people.favorite_foods) WHERE json_each.value = ?1)";

const REQUIRED_COLUMNS: &[&str] = &["uuid", "name", "age", "favorite_foods", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound(PersonId),
    NameNotFound(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::NameNotFound(name) => write!(f, "no person found with name `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Options for the chained favorite-food query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteFoodQuery {
    /// Sort results ascending by name (ties break on insertion order).
    pub sort_by_name: bool,
    /// Maximum rows to return. `None` returns every match.
    pub limit: Option<u32>,
    /// Project the `age` field out of returned records.
    pub exclude_age: bool,
}

/// Repository interface for person CRUD operations.
///
/// Every method issues one logical request against the store and surfaces the
/// store outcome unchanged: no retries, no backoff, no idempotency keys.
pub trait PersonRepository {
    /// Stores a new record and returns it with its assigned id.
    fn insert_one(&self, draft: &NewPerson) -> RepoResult<Person>;
    /// Batch insert. Rows are inserted one by one without an enclosing
    /// transaction; a mid-batch failure leaves earlier rows in place.
    fn insert_many(&self, drafts: &[NewPerson]) -> RepoResult<Vec<Person>>;
    /// Returns all records whose name matches exactly, in store order.
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Person>>;
    /// Returns the first record (store order) containing the given food.
    fn find_one_by_favorite_food(&self, food: &str) -> RepoResult<Option<Person>>;
    /// Loads by id, appends `food` unless already present, persists the full
    /// record. Read-modify-write: not atomic under concurrent writers.
    fn append_favorite_food_if_absent(&self, id: PersonId, food: &str) -> RepoResult<Person>;
    /// Sets the age of the first record matching `name`.
    fn set_age_by_name(&self, name: &str, new_age: u32) -> RepoResult<Person>;
    /// Removes a record by id and returns it.
    fn delete_by_id(&self, id: PersonId) -> RepoResult<Person>;
    /// Removes all records matching `name`; returns the count deleted.
    fn delete_all_by_name(&self, name: &str) -> RepoResult<usize>;
    /// Chained query: filter by food, optional name sort, limit, age
    /// projection.
    fn query_favorite_food(&self, food: &str, query: &FavoriteFoodQuery)
        -> RepoResult<Vec<Person>>;
    /// Removes every record; returns the count deleted.
    fn delete_all(&self) -> RepoResult<usize>;
    /// Returns all records in store order.
    fn list_people(&self) -> RepoResult<Vec<Person>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Rejects connections whose schema version or `people` table shape does
    /// not match what this binary expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert_one(&self, draft: &NewPerson) -> RepoResult<Person> {
        draft.validate()?;

        let stored = draft.clone().with_id(Uuid::new_v4());
        self.conn.execute(
            "INSERT INTO people (uuid, name, age, favorite_foods)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                stored.id.to_string(),
                stored.name.as_str(),
                stored.age.map(i64::from),
                encode_foods(&stored.favorite_foods)?,
            ],
        )?;

        Ok(stored)
    }

    fn insert_many(&self, drafts: &[NewPerson]) -> RepoResult<Vec<Person>> {
        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            stored.push(self.insert_one(draft)?);
        }
        Ok(stored)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE name = ?1
             ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query(params![name])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }

        Ok(people)
    }

    fn find_one_by_favorite_food(&self, food: &str) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE {FOOD_FILTER_SQL}
             ORDER BY rowid ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![food])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn append_favorite_food_if_absent(&self, id: PersonId, food: &str) -> RepoResult<Person> {
        let mut person = self.get_by_id(id)?.ok_or(RepoError::NotFound(id))?;

        if person.likes(food) {
            return Ok(person);
        }

        person.favorite_foods.push(food.to_string());
        self.save(&person)?;
        Ok(person)
    }

    fn set_age_by_name(&self, name: &str, new_age: u32) -> RepoResult<Person> {
        let mut person = self
            .first_by_name(name)?
            .ok_or_else(|| RepoError::NameNotFound(name.to_string()))?;

        self.conn.execute(
            "UPDATE people
             SET
                age = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![i64::from(new_age), person.id.to_string()],
        )?;

        person.age = Some(new_age);
        Ok(person)
    }

    fn delete_by_id(&self, id: PersonId) -> RepoResult<Person> {
        let person = self.get_by_id(id)?.ok_or(RepoError::NotFound(id))?;

        self.conn.execute(
            "DELETE FROM people WHERE uuid = ?1;",
            params![id.to_string()],
        )?;

        Ok(person)
    }

    fn delete_all_by_name(&self, name: &str) -> RepoResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM people WHERE name = ?1;", params![name])?;
        Ok(deleted)
    }

    fn query_favorite_food(
        &self,
        food: &str,
        query: &FavoriteFoodQuery,
    ) -> RepoResult<Vec<Person>> {
        // The age projection happens in SQL so excluded fields never leave
        // the store.
        let age_column = if query.exclude_age { "NULL AS age" } else { "age" };
        let mut sql = format!(
            "SELECT uuid, name, {age_column}, favorite_foods
             FROM people
             WHERE {FOOD_FILTER_SQL}"
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(food.to_string())];

        if query.sort_by_name {
            sql.push_str(" ORDER BY name ASC, rowid ASC");
        } else {
            sql.push_str(" ORDER BY rowid ASC");
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut people = Vec::new();

        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }

        Ok(people)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM people;", [])?;
        Ok(deleted)
    }

    fn list_people(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} ORDER BY rowid ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }

        Ok(people)
    }
}

impl SqlitePersonRepository<'_> {
    fn get_by_id(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn first_by_name(&self, name: &str) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE name = ?1
             ORDER BY rowid ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    /// Full-document save used by the read-modify-write update path.
    fn save(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let changed = self.conn.execute(
            "UPDATE people
             SET
                name = ?1,
                age = ?2,
                favorite_foods = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?4;",
            params![
                person.name.as_str(),
                person.age.map(i64::from),
                encode_foods(&person.favorite_foods)?,
                person.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(person.id));
        }

        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'people'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("people"));
    }

    for &column in REQUIRED_COLUMNS {
        let column_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM pragma_table_info('people') WHERE name = ?1
            );",
            params![column],
            |row| row.get(0),
        )?;
        if column_exists == 0 {
            return Err(RepoError::MissingRequiredColumn {
                table: "people",
                column,
            });
        }
    }

    Ok(())
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in people.uuid"))
    })?;

    let age = match row.get::<_, Option<i64>>("age")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid age value `{value}` in people.age"))
        })?),
        None => None,
    };

    let foods_text: String = row.get("favorite_foods")?;
    let favorite_foods: Vec<String> = serde_json::from_str(&foods_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid favorite_foods value in people.favorite_foods: {err}"
        ))
    })?;

    let person = Person {
        id,
        name: row.get("name")?,
        age,
        favorite_foods,
    };
    person.validate()?;
    Ok(person)
}

fn encode_foods(foods: &[String]) -> RepoResult<String> {
    serde_json::to_string(foods)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode favorite_foods: {err}")))
}
