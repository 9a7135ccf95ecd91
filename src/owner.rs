// Copyright 2025 Cowboy AI, LLC.

//! The Owner aggregate
//!
//! An owner exclusively holds its pets. Pets are reached only through the
//! owner, and an owner can only be constructed through [`OwnerBuilder`],
//! which refuses incomplete contact data.
//!
//! ```mermaid
//! graph LR
//!     Form[OwnerForm] --> Builder[OwnerBuilder]
//!     Builder -->|build| Owner
//!     Builder -->|build| Err[OwnerBuildError]
//!     Owner --> Pets[Pet*]
//!     Pets --> Visits[Visit*]
//! ```

use crate::entity::{Persistable, RecordId};
use crate::errors::OwnerBuildError;
use crate::pet::Pet;
use crate::validation::{is_blank, is_valid_telephone};
use serde::{Deserialize, Serialize};

/// Digits a telephone number must have unless configured otherwise
pub const DEFAULT_TELEPHONE_DIGITS: usize = 10;

/// A pet owner and the pets they own
///
/// Serialize-only: owners enter the system through [`OwnerBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    id: Option<RecordId<Owner>>,
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    telephone: String,
    pets: Vec<Pet>,
}

impl Owner {
    /// Start building an owner
    pub fn builder() -> OwnerBuilder {
        OwnerBuilder::new()
    }

    /// First name
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Last name
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Street address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Telephone digits
    pub fn telephone(&self) -> &str {
        &self.telephone
    }

    /// Pets in insertion order
    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub(crate) fn pets_mut(&mut self) -> &mut [Pet] {
        &mut self.pets
    }

    pub(crate) fn assign_id(&mut self, id: RecordId<Owner>) {
        self.id = Some(id);
    }

    /// Append a pet, keeping insertion order
    pub fn add_pet(&mut self, pet: Pet) {
        self.pets.push(pet);
    }

    /// Find a pet by name, ignoring case
    ///
    /// Absent, empty and whitespace-only names match nothing. When
    /// `include_new` is false, pets that have not been persisted yet are
    /// skipped. The first match in insertion order wins.
    pub fn find_pet_by_name<'a>(
        &self,
        name: impl Into<Option<&'a str>>,
        include_new: bool,
    ) -> Option<&Pet> {
        let name = name.into().filter(|n| !n.trim().is_empty())?;
        let wanted = name.to_lowercase();

        self.pets
            .iter()
            .filter(|pet| include_new || !pet.is_new())
            .find(|pet| {
                pet.name
                    .as_deref()
                    .is_some_and(|own| own.to_lowercase() == wanted)
            })
    }

    /// Find a persisted pet by its ID
    pub fn find_pet_by_id(&self, id: impl Into<RecordId<Pet>>) -> Option<&Pet> {
        let id = Some(id.into());
        self.pets.iter().find(|pet| pet.id == id)
    }

    /// Mutable form of [`find_pet_by_id`](Self::find_pet_by_id)
    pub fn find_pet_by_id_mut(&mut self, id: impl Into<RecordId<Pet>>) -> Option<&mut Pet> {
        let id = Some(id.into());
        self.pets.iter_mut().find(|pet| pet.id == id)
    }

    /// Turn this owner back into a builder, keeping ID and pets
    pub fn to_builder(&self) -> OwnerBuilder {
        OwnerBuilder {
            id: self.id,
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            address: Some(self.address.clone()),
            city: Some(self.city.clone()),
            telephone: Some(self.telephone.clone()),
            pets: self.pets.clone(),
            telephone_digits: DEFAULT_TELEPHONE_DIGITS,
        }
    }
}

impl Persistable for Owner {
    type Marker = Owner;

    fn id(&self) -> Option<RecordId<Owner>> {
        self.id
    }
}

/// Fail-fast builder for [`Owner`]
///
/// Checks run in field order and stop at the first failure: first name,
/// last name, address, city, telephone presence, telephone format, then
/// uniqueness of the initial pets' names.
#[derive(Debug, Clone)]
pub struct OwnerBuilder {
    id: Option<RecordId<Owner>>,
    first_name: Option<String>,
    last_name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    telephone: Option<String>,
    pets: Vec<Pet>,
    telephone_digits: usize,
}

impl OwnerBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            id: None,
            first_name: None,
            last_name: None,
            address: None,
            city: None,
            telephone: None,
            pets: Vec::new(),
            telephone_digits: DEFAULT_TELEPHONE_DIGITS,
        }
    }

    /// Set the persisted ID
    pub fn id(mut self, id: impl Into<RecordId<Owner>>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the first name
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Set the last name
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the street address
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the city
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the telephone
    pub fn telephone(mut self, telephone: impl Into<String>) -> Self {
        self.telephone = Some(telephone.into());
        self
    }

    /// Add an initial pet
    pub fn pet(mut self, pet: Pet) -> Self {
        self.pets.push(pet);
        self
    }

    /// Replace the initial pets
    pub fn pets(mut self, pets: Vec<Pet>) -> Self {
        self.pets = pets;
        self
    }

    /// Require a different number of telephone digits
    pub fn telephone_digits(mut self, digits: usize) -> Self {
        self.telephone_digits = digits;
        self
    }

    /// Copy the contact fields of a form over this builder
    ///
    /// Fields absent from the form are cleared, so `build` reports them.
    pub fn form(mut self, form: &OwnerForm) -> Self {
        self.first_name = form.first_name.clone();
        self.last_name = form.last_name.clone();
        self.address = form.address.clone();
        self.city = form.city.clone();
        self.telephone = form.telephone.clone();
        self
    }

    /// Validate and build the owner
    pub fn build(self) -> Result<Owner, OwnerBuildError> {
        let first_name = required(self.first_name, OwnerBuildError::MissingFirstName)?;
        let last_name = required(self.last_name, OwnerBuildError::MissingLastName)?;
        let address = required(self.address, OwnerBuildError::MissingAddress)?;
        let city = required(self.city, OwnerBuildError::MissingCity)?;
        let telephone = required(self.telephone, OwnerBuildError::MissingTelephone)?;

        if !is_valid_telephone(&telephone, self.telephone_digits) {
            return Err(OwnerBuildError::InvalidTelephone {
                expected: self.telephone_digits,
            });
        }

        for (index, pet) in self.pets.iter().enumerate() {
            let Some(name) = pet.name.as_deref() else {
                continue;
            };
            if self.pets[..index].iter().any(|earlier| earlier.has_name(name)) {
                return Err(OwnerBuildError::DuplicatePetName {
                    name: name.to_string(),
                });
            }
        }

        Ok(Owner {
            id: self.id,
            first_name,
            last_name,
            address,
            city,
            telephone,
            pets: self.pets,
        })
    }
}

impl Default for OwnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn required(value: Option<String>, missing: OwnerBuildError) -> Result<String, OwnerBuildError> {
    match value {
        Some(value) if !is_blank(Some(value.as_str())) => Ok(value),
        _ => Err(missing),
    }
}

/// Owner data as it arrives in a request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerForm {
    /// ID claimed by the body, if any
    pub id: Option<i32>,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Telephone
    pub telephone: Option<String>,
}

impl From<&Owner> for OwnerForm {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id.map(i32::from),
            first_name: Some(owner.first_name.clone()),
            last_name: Some(owner.last_name.clone()),
            address: Some(owner.address.clone()),
            city: Some(owner.city.clone()),
            telephone: Some(owner.telephone.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::PetType;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn george() -> OwnerBuilder {
        Owner::builder()
            .first_name("George")
            .last_name("Franklin")
            .address("110 W. Liberty St.")
            .city("Madison")
            .telephone("6085551023")
    }

    fn owner_with_pets() -> Owner {
        let mut owner = george().id(1).build().unwrap();
        owner.add_pet(Pet::named("Fluffy").with_id(10));
        owner.add_pet(Pet::named("Rex").with_id(11));
        owner.add_pet(Pet::named("Basil"));
        owner
    }

    #[test]
    fn test_build_complete_owner() {
        let owner = george().build().unwrap();

        assert!(owner.is_new());
        assert_eq!(owner.first_name(), "George");
        assert_eq!(owner.telephone(), "6085551023");
        assert!(owner.pets().is_empty());
    }

    #[test]
    fn test_build_with_id_and_pets() {
        let owner = george()
            .id(4)
            .pet(Pet::named("Leo").with_id(1))
            .build()
            .unwrap();

        assert_eq!(owner.id(), Some(RecordId::new(4)));
        assert_eq!(owner.pets().len(), 1);
    }

    #[test_case(george().first_name(""), OwnerBuildError::MissingFirstName ; "empty first name")]
    #[test_case(george().last_name("  "), OwnerBuildError::MissingLastName ; "blank last name")]
    #[test_case(george().address("\t"), OwnerBuildError::MissingAddress ; "blank address")]
    #[test_case(george().city(""), OwnerBuildError::MissingCity ; "empty city")]
    #[test_case(george().telephone(" "), OwnerBuildError::MissingTelephone ; "blank telephone")]
    #[test_case(george().telephone("123456789"), OwnerBuildError::InvalidTelephone { expected: 10 } ; "nine digits")]
    #[test_case(george().telephone("123-456-7890"), OwnerBuildError::InvalidTelephone { expected: 10 } ; "dashes")]
    fn test_build_rejects(builder: OwnerBuilder, expected: OwnerBuildError) {
        assert_eq!(builder.build().unwrap_err(), expected);
    }

    #[test]
    fn test_build_fails_fast_in_field_order() {
        let err = Owner::builder().telephone("bad").build().unwrap_err();
        assert_eq!(err, OwnerBuildError::MissingFirstName);
        assert_eq!(err.to_string(), "First name is required and cannot be blank");

        let err = george().telephone("123").build().unwrap_err();
        assert_eq!(err.to_string(), "Telephone must be exactly 10 digits");
    }

    #[test]
    fn test_build_rejects_duplicate_initial_pet_names() {
        let err = george()
            .pet(Pet::named("Max").with_id(1))
            .pet(Pet::named("Rosy").with_id(2))
            .pet(Pet::named("MAX"))
            .build()
            .unwrap_err();

        assert_eq!(err, OwnerBuildError::DuplicatePetName { name: "MAX".into() });
    }

    #[test]
    fn test_unnamed_initial_pets_are_not_duplicates() {
        assert!(george().pet(Pet::new()).pet(Pet::new()).build().is_ok());
    }

    #[test]
    fn test_telephone_digits_configurable() {
        assert!(george().telephone("12345678").telephone_digits(8).build().is_ok());
        assert_eq!(
            george().telephone_digits(8).build().unwrap_err(),
            OwnerBuildError::InvalidTelephone { expected: 8 }
        );
    }

    #[test]
    fn test_builder_from_form_clears_missing_fields() {
        let form = OwnerForm {
            first_name: Some("Betty".into()),
            ..OwnerForm::default()
        };
        let err = george().form(&form).build().unwrap_err();
        assert_eq!(err, OwnerBuildError::MissingLastName);
    }

    #[test]
    fn test_to_builder_round_trips() {
        let owner = owner_with_pets();
        assert_eq!(owner.to_builder().build().unwrap(), owner);
        assert_eq!(OwnerForm::from(&owner).id, Some(1));
    }

    #[test]
    fn test_add_pet_keeps_order() {
        let owner = owner_with_pets();
        let names: Vec<_> = owner.pets().iter().map(|p| p.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Fluffy", "Rex", "Basil"]);
        assert!(owner.pets()[2].visits.is_empty());
    }

    #[test_case("FLUFFY" ; "upper case")]
    #[test_case("fluffy" ; "lower case")]
    #[test_case("Fluffy" ; "exact")]
    fn test_find_by_name_ignores_case(name: &str) {
        let owner = owner_with_pets();
        let found = owner.find_pet_by_name(name, true).unwrap();
        assert_eq!(found.id, Some(RecordId::new(10)));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some("") ; "empty")]
    #[test_case(Some("   ") ; "whitespace")]
    fn test_find_by_blank_name_matches_nothing(name: Option<&str>) {
        assert_eq!(owner_with_pets().find_pet_by_name(name, true), None);
    }

    #[test]
    fn test_find_by_name_can_skip_new_pets() {
        let owner = owner_with_pets();
        assert!(owner.find_pet_by_name("basil", true).is_some());
        assert_eq!(owner.find_pet_by_name("basil", false), None);
        assert!(owner.find_pet_by_name("rex", false).is_some());
    }

    #[test]
    fn test_unnamed_pets_never_match() {
        let mut owner = george().build().unwrap();
        owner.add_pet(Pet::new());
        assert_eq!(owner.find_pet_by_name("anything", true), None);
    }

    #[test]
    fn test_first_match_wins() {
        let mut owner = george().build().unwrap();
        owner.add_pet(Pet::named("Max").with_id(1));
        owner.add_pet(Pet::named("MAX").with_id(2));

        assert_eq!(owner.find_pet_by_name("max", true).unwrap().id, Some(RecordId::new(1)));
    }

    #[test]
    fn test_find_by_id() {
        let mut owner = owner_with_pets();
        assert_eq!(owner.find_pet_by_id(11).unwrap().name.as_deref(), Some("Rex"));
        assert_eq!(owner.find_pet_by_id(99), None);

        owner
            .find_pet_by_id_mut(11)
            .unwrap()
            .pet_type = Some(PetType::new(2, "Dog"));
        assert_eq!(owner.pets()[1].pet_type.as_ref().unwrap().name, "Dog");
    }

    #[test]
    fn test_owner_json_shape() {
        let owner = george().id(1).build().unwrap();
        let json = serde_json::to_value(&owner).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "firstName": "George",
                "lastName": "Franklin",
                "address": "110 W. Liberty St.",
                "city": "Madison",
                "telephone": "6085551023",
                "pets": []
            })
        );
    }

    proptest! {
        #[test]
        fn lookup_is_case_insensitive(name in "[A-Za-z][A-Za-z0-9 ]{0,15}") {
            let mut owner = george().build().unwrap();
            owner.add_pet(Pet::named(name.clone()).with_id(1));

            let upper = owner.find_pet_by_name(name.to_uppercase().as_str(), false);
            let lower = owner.find_pet_by_name(name.to_lowercase().as_str(), false);

            prop_assert!(upper.is_some());
            prop_assert_eq!(upper, lower);
        }

        #[test]
        fn whitespace_names_never_match(blank in "[ \t]{0,8}") {
            let mut owner = george().build().unwrap();
            owner.add_pet(Pet::named(blank.clone()));
            prop_assert_eq!(owner.find_pet_by_name(blank.as_str(), true), None);
        }
    }
}
