//! Postgres-backed repository tests.
//!
//! Run with `DATABASE_URL` pointing at a scratch database:
//! `cargo test -p vetpro-db -- --ignored`

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vetpro_core::models::{
    AppointmentInput, AppointmentStatus, ClientInput, MedicalRecordInput, PetGender, PetInput,
};
use vetpro_db::{
    connect, run_migrations, AppointmentRepository, ClientRepository, MedicalRecordRepository,
    PetRepository, TenantRepository,
};

async fn setup_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let pool = connect(&url, 5, 30).await.expect("Failed to connect");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

async fn insert_tenant(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tenants (id, name, slug) VALUES ($1, $2, $3)")
        .bind(id)
        .bind("Clinica de prueba")
        .bind(format!("test-{}", id))
        .execute(pool)
        .await
        .expect("Failed to insert tenant");
    id
}

fn client_input(first_name: &str) -> ClientInput {
    ClientInput {
        first_name: first_name.to_string(),
        last_name: "Pérez".to_string(),
        email: None,
        phone: Some("+54 11 5555-0101".to_string()),
        address: None,
    }
}

fn pet_input(client_id: Uuid) -> PetInput {
    PetInput {
        client_id,
        name: "Rocco".to_string(),
        species: "Perro".to_string(),
        breed: Some("Golden Retriever".to_string()),
        age: 4.0,
        weight: 32.0,
        gender: PetGender::Male,
        photo_url: None,
    }
}

#[tokio::test]
#[ignore]
async fn test_clients_are_invisible_to_other_tenants() {
    let pool = setup_pool().await;
    let tenant_a = insert_tenant(&pool).await;
    let tenant_b = insert_tenant(&pool).await;
    let clients = ClientRepository::new(pool.clone());

    let created = clients
        .create_client(tenant_a, &client_input("Juan"))
        .await
        .unwrap();

    let listed_a = clients.list_clients_with_stats(tenant_a).await.unwrap();
    assert_eq!(
        listed_a.iter().filter(|c| c.client.id == created.id).count(),
        1
    );

    let listed_b = clients.list_clients_with_stats(tenant_b).await.unwrap();
    assert!(listed_b.iter().all(|c| c.client.id != created.id));
    assert!(clients.get_client(tenant_b, created.id).await.unwrap().is_none());
    assert!(!clients.delete_client(tenant_b, created.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_pet_owner_must_belong_to_tenant() {
    let pool = setup_pool().await;
    let tenant_a = insert_tenant(&pool).await;
    let tenant_b = insert_tenant(&pool).await;
    let clients = ClientRepository::new(pool.clone());
    let pets = PetRepository::new(pool.clone());

    let owner = clients
        .create_client(tenant_a, &client_input("Marta"))
        .await
        .unwrap();

    let result = pets.create_pet(tenant_b, &pet_input(owner.id)).await;
    assert!(result.is_err());

    let pet = pets.create_pet(tenant_a, &pet_input(owner.id)).await.unwrap();
    let fetched = pets.get_pet(tenant_a, pet.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Rocco");
    assert_eq!(fetched.weight, 32.0);

    let stats = clients.list_clients_with_stats(tenant_a).await.unwrap();
    let owner_stats = stats.iter().find(|c| c.client.id == owner.id).unwrap();
    assert_eq!(owner_stats.pet_count, 1);
}

#[tokio::test]
#[ignore]
async fn test_client_delete_cascades() {
    let pool = setup_pool().await;
    let tenant = insert_tenant(&pool).await;
    let clients = ClientRepository::new(pool.clone());
    let pets = PetRepository::new(pool.clone());
    let appointments = AppointmentRepository::new(pool.clone());
    let records = MedicalRecordRepository::new(pool.clone());

    let owner = clients
        .create_client(tenant, &client_input("Carlos"))
        .await
        .unwrap();
    let pet = pets.create_pet(tenant, &pet_input(owner.id)).await.unwrap();
    let appointment = appointments
        .create_appointment(
            tenant,
            &AppointmentInput {
                client_id: owner.id,
                pet_id: pet.id,
                veterinarian_id: None,
                date_time: Utc::now() + Duration::hours(2),
                status: AppointmentStatus::Pending,
                reason: "Control".to_string(),
                notes: None,
            },
        )
        .await
        .unwrap();
    records
        .create_record(
            tenant,
            &MedicalRecordInput {
                pet_id: pet.id,
                veterinarian_id: None,
                diagnosis: "Vacunación Anual".to_string(),
                treatment: "Séxtuple + Rabia".to_string(),
                symptoms: None,
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    assert!(clients.delete_client(tenant, owner.id).await.unwrap());

    assert!(pets.get_pet(tenant, pet.id).await.unwrap().is_none());
    assert!(appointments
        .get_appointment_with_details(tenant, appointment.id)
        .await
        .unwrap()
        .is_none());
    assert!(records
        .list_records_for_pet(tenant, pet.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore]
async fn test_status_update_and_filter() {
    let pool = setup_pool().await;
    let tenant = insert_tenant(&pool).await;
    let clients = ClientRepository::new(pool.clone());
    let pets = PetRepository::new(pool.clone());
    let appointments = AppointmentRepository::new(pool.clone());
    let tenants = TenantRepository::new(pool.clone());

    let owner = clients
        .create_client(tenant, &client_input("Elena"))
        .await
        .unwrap();
    let pet = pets.create_pet(tenant, &pet_input(owner.id)).await.unwrap();
    let appointment = appointments
        .create_appointment(
            tenant,
            &AppointmentInput {
                client_id: owner.id,
                pet_id: pet.id,
                veterinarian_id: None,
                date_time: Utc::now() + Duration::hours(1),
                status: AppointmentStatus::Pending,
                reason: "Vacunación".to_string(),
                notes: None,
            },
        )
        .await
        .unwrap();

    let pending = appointments
        .list_appointments_with_details(tenant, Some(AppointmentStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].pet.as_ref().unwrap().name, "Rocco");

    appointments
        .update_status(tenant, appointment.id, AppointmentStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();

    let all = appointments
        .list_appointments_with_details(tenant, None)
        .await
        .unwrap();
    assert_eq!(all[0].appointment.status, AppointmentStatus::Confirmed);

    let tenant_row = tenants.get_tenant_by_id(tenant).await.unwrap().unwrap();
    assert_eq!(tenant_row.settings.currency, "USD");
}
