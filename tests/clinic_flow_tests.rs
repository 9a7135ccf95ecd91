//! Integration tests for owner and pet flows over in-memory storage

use chrono::{Days, NaiveDate};
use petclinic_domain::{
    ClinicConfig, ErrorResponseMapper, InMemoryOwnerRepository, InMemoryPetTypeRepository,
    OwnerForm, OwnerRepository, OwnerService, Persistable, PetForm, PetService, RecordId,
    ServiceError,
};
use pretty_assertions::assert_eq;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn george() -> OwnerForm {
    OwnerForm {
        id: None,
        first_name: Some("George".into()),
        last_name: Some("Franklin".into()),
        address: Some("110 W. Liberty St.".into()),
        city: Some("Madison".into()),
        telephone: Some("6085551023".into()),
    }
}

fn clinic() -> (
    OwnerService<InMemoryOwnerRepository>,
    PetService<InMemoryOwnerRepository, InMemoryPetTypeRepository>,
) {
    let owners = InMemoryOwnerRepository::new();
    (
        OwnerService::new(owners.clone(), ClinicConfig::default()),
        PetService::new(owners, InMemoryPetTypeRepository::with_standard_types()),
    )
}

#[test]
fn owner_lifecycle() {
    let (owners, _) = clinic();

    let created = owners.create_owner(george()).unwrap();
    let id = created.id().unwrap().value();
    assert_eq!(owners.get_owner(id).unwrap(), created);

    let moved = OwnerForm {
        id: Some(id),
        address: Some("638 Cardinal Ave.".into()),
        city: Some("Sun Prairie".into()),
        ..george()
    };
    let updated = owners.update_owner(id, moved).unwrap();
    assert_eq!(updated.city(), "Sun Prairie");

    owners.delete_owner(id).unwrap();
    let err = owners.get_owner(id).unwrap_err();
    assert!(err.as_domain().unwrap().is_not_found());
}

#[test]
fn create_owner_ignores_body_id() {
    let (owners, _) = clinic();
    let created = owners
        .create_owner(OwnerForm {
            id: Some(42),
            ..george()
        })
        .unwrap();
    assert_eq!(created.id(), Some(RecordId::new(1)));
}

#[test]
fn rejected_owner_renders_binding_report() {
    let (owners, _) = clinic();
    let form = OwnerForm {
        telephone: Some("123-456-7890".into()),
        ..george()
    };

    let err = owners.create_owner(form).unwrap_err();
    let response = ErrorResponseMapper::default().map_service_error(&err, "/api/owners");

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.report.error_code, "VALIDATION_ERROR");
    let entry = &response.report.field_errors.unwrap()[0];
    assert_eq!(entry.field, "telephone");
    assert_eq!(entry.rejected_value.as_deref(), Some("123-456-7890"));
    assert!(owners.repository().is_empty().unwrap());
}

#[test]
fn update_with_mismatched_body_id_is_rule_violation() {
    let (owners, _) = clinic();
    let id = owners.create_owner(george()).unwrap().id().unwrap().value();

    let err = owners
        .update_owner(
            id,
            OwnerForm {
                id: Some(id + 1),
                ..george()
            },
        )
        .unwrap_err();

    let response = ErrorResponseMapper::default().map_service_error(&err, "/api/owners/1");
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.report.error_code, "BUSINESS_RULE_VIOLATION");
}

#[test]
fn missing_owner_is_not_found_everywhere() {
    let (owners, pets) = clinic();

    for err in [
        owners.get_owner(999).unwrap_err(),
        owners.update_owner(999, george()).unwrap_err(),
        owners.delete_owner(999).unwrap_err(),
        pets.create_pet(999, PetForm::new("Leo", today(), "cat"), today())
            .unwrap_err(),
    ] {
        let response = ErrorResponseMapper::default().map_service_error(&err, "/owners/999");
        assert_eq!(response.status_code(), 404);
        assert!(response.report.message.contains("999"));
    }
}

#[test]
fn search_pages_by_last_name_prefix() {
    let (owners, _) = clinic();
    for last_name in ["Davis", "Davis", "Franklin", "Davies", "Black", "Davo", "Dave"] {
        owners
            .create_owner(OwnerForm {
                last_name: Some(last_name.into()),
                ..george()
            })
            .unwrap();
    }

    let first = owners.search_owners(Some("Dav"), None, None).unwrap();
    assert_eq!(first.number_of_elements(), 5);
    assert_eq!(first.total_elements, 5);
    assert!(first.is_last());

    let small = owners.search_owners(Some("Dav"), Some(1), Some(2)).unwrap();
    let names: Vec<&str> = small.content.iter().map(|o| o.last_name()).collect();
    assert_eq!(names, vec!["Davies", "Davo"]);
    assert_eq!(small.total_pages(), 3);

    let everyone = owners.list_owners(None, None).unwrap();
    assert_eq!(everyone.total_elements, 7);
    assert_eq!(everyone.size, 10);
}

#[test]
fn pet_lifecycle() {
    let (owners, pets) = clinic();
    let owner_id = owners.create_owner(george()).unwrap().id().unwrap().value();
    let born = NaiveDate::from_ymd_opt(2020, 8, 6).unwrap();

    let saved = pets
        .create_pet(owner_id, PetForm::new("Leo", born, "cat"), today())
        .unwrap();
    let leo = saved.find_pet_by_name("LEO", false).unwrap();
    let leo_id = leo.id().unwrap().value();
    assert_eq!(leo.age_on(today()), 3);

    let edited = pets
        .update_pet(
            owner_id,
            leo_id,
            PetForm {
                name: Some("Leonard".into()),
                pet_type: Some("dog".into()),
                ..PetForm::default()
            },
            today(),
        )
        .unwrap();

    let leonard = edited.find_pet_by_id(leo_id).unwrap();
    assert_eq!(leonard.name.as_deref(), Some("Leonard"));
    assert_eq!(leonard.birth_date, Some(born));
    assert_eq!(leonard.pet_type.as_ref().unwrap().name, "dog");

    let stored = owners.repository().find_by_id(RecordId::new(owner_id)).unwrap().unwrap();
    assert_eq!(stored.pets().len(), 1);
}

#[test]
fn second_pet_with_same_name_is_rejected() {
    let (owners, pets) = clinic();
    let owner_id = owners.create_owner(george()).unwrap().id().unwrap().value();
    let born = NaiveDate::from_ymd_opt(2020, 8, 6).unwrap();
    pets.create_pet(owner_id, PetForm::new("Leo", born, "cat"), today())
        .unwrap();

    let err = pets
        .create_pet(owner_id, PetForm::new("leo", born, "dog"), today())
        .unwrap_err();

    let ServiceError::Domain(domain) = &err else {
        panic!("expected a domain error, got {err:?}");
    };
    assert_eq!(domain.error_code(), "PET_VALIDATION_ERROR");
    assert_eq!(domain.field_errors().unwrap()["name"], vec!["already exists"]);
}

#[test]
fn future_birth_date_and_blank_name_reported_together() {
    let (owners, pets) = clinic();
    let owner_id = owners.create_owner(george()).unwrap().id().unwrap().value();
    let tomorrow = today().checked_add_days(Days::new(1)).unwrap();

    let err = pets
        .create_pet(owner_id, PetForm::new("  ", tomorrow, "cat"), today())
        .unwrap_err();
    let response = ErrorResponseMapper::default().map_service_error(&err, "/owners/1/pets/new");

    let fields: Vec<(String, String)> = response
        .report
        .field_errors
        .unwrap()
        .into_iter()
        .map(|e| (e.field, e.message))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("name".to_string(), "required".to_string()),
            ("birthDate".to_string(), "invalid date".to_string()),
        ]
    );
}

#[test]
fn pet_types_come_sorted() {
    let (_, pets) = clinic();
    let names: Vec<String> = pets.pet_types().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names.first().map(String::as_str), Some("bird"));
    assert_eq!(names.len(), 6);
}
