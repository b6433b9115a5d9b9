//! Person use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::person::{NewPerson, Person, PersonId};
use crate::repo::person_repo::{FavoriteFoodQuery, PersonRepository, RepoResult};

/// Use-case service wrapper for person CRUD operations.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores one new person and returns the stored record.
    pub fn insert_one(&self, draft: &NewPerson) -> RepoResult<Person> {
        self.repo.insert_one(draft)
    }

    /// Stores a batch of new people in order.
    pub fn insert_many(&self, drafts: &[NewPerson]) -> RepoResult<Vec<Person>> {
        self.repo.insert_many(drafts)
    }

    /// Finds all people whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> RepoResult<Vec<Person>> {
        self.repo.find_by_name(name)
    }

    /// Finds the first person who lists the given food.
    pub fn find_one_by_favorite_food(&self, food: &str) -> RepoResult<Option<Person>> {
        self.repo.find_one_by_favorite_food(food)
    }

    /// Appends a food to a person's list unless already present.
    ///
    /// Returns repository-level not-found errors unchanged.
    pub fn append_favorite_food_if_absent(
        &self,
        id: PersonId,
        food: &str,
    ) -> RepoResult<Person> {
        self.repo.append_favorite_food_if_absent(id, food)
    }

    /// Sets the age of the first person matching the name.
    pub fn set_age_by_name(&self, name: &str, new_age: u32) -> RepoResult<Person> {
        self.repo.set_age_by_name(name, new_age)
    }

    /// Deletes one person by id and returns the removed record.
    pub fn delete_by_id(&self, id: PersonId) -> RepoResult<Person> {
        self.repo.delete_by_id(id)
    }

    /// Deletes every person matching the name; returns the count.
    pub fn delete_all_by_name(&self, name: &str) -> RepoResult<usize> {
        self.repo.delete_all_by_name(name)
    }

    /// Runs the chained favorite-food query (filter, sort, limit, projection).
    pub fn query_favorite_food(
        &self,
        food: &str,
        query: &FavoriteFoodQuery,
    ) -> RepoResult<Vec<Person>> {
        self.repo.query_favorite_food(food, query)
    }

    /// Deletes every record; returns the count. Intended for reset paths.
    pub fn delete_all(&self) -> RepoResult<usize> {
        self.repo.delete_all()
    }

    /// Lists every record in store order.
    pub fn list_people(&self) -> RepoResult<Vec<Person>> {
        self.repo.list_people()
    }
}
