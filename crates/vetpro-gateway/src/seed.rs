//! Fixed demo dataset written to empty local collections.
//!
//! Seeded ids are deterministic so the collections reference each other consistently no
//! matter which one is seeded first.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;
use vetpro_core::models::{
    Appointment, AppointmentStatus, Client, MedicalRecord, Pet, PetGender,
};

const CLIENT_KIND: u128 = 0xc1;
const PET_KIND: u128 = 0xa7;
const APPOINTMENT_KIND: u128 = 0xa9;
const RECORD_KIND: u128 = 0xec;

fn seed_id(kind: u128, n: usize) -> Uuid {
    Uuid::from_u128((kind << 96) | n as u128)
}

pub fn client_id(n: usize) -> Uuid {
    seed_id(CLIENT_KIND, n)
}

pub fn pet_id(n: usize) -> Uuid {
    seed_id(PET_KIND, n)
}

// first name, last name, email, phone, address
const CLIENTS: [(&str, &str, &str, &str, &str); 10] = [
    ("Juan", "Pérez", "juan.perez@email.com", "+54 11 5555-0101", "Av. Santa Fe 1234, CABA"),
    ("Marta", "Sánchez", "marta.s@gmail.com", "+54 11 5555-0202", "Pueyrredón 456, CABA"),
    ("Carlos", "Gómez", "carlos.g@outlook.com", "+54 11 5555-0303", "Av. Cabildo 2200, CABA"),
    ("Elena", "Rodríguez", "elena.rod@speedy.com", "+54 11 5555-0404", "Juramento 1500, CABA"),
    ("Roberto", "Martínez", "roberto.m@gmail.com", "+54 11 5555-0505", "Av. Corrientes 3800, CABA"),
    ("Lucía", "Fernández", "lucia.f@hotmail.com", "+54 11 5555-0606", "Scalabrini Ortiz 1200, CABA"),
    ("Diego", "López", "dlopez@empresa.com", "+54 11 5555-0707", "Av. Rivadavia 5100, CABA"),
    ("Carmen", "Ruiz", "carmen.ruiz@gmail.com", "+54 11 5555-0808", "Yerbal 800, CABA"),
    ("Alberto", "Torres", "atorres@gmail.com", "+54 11 5555-0909", "Gurruchaga 2100, CABA"),
    ("Sofia", "Castro", "sofia.castro@icloud.com", "+54 11 5555-1010", "Malabia 1500, CABA"),
];

// name, species, breed, gender, age, weight. Pet n belongs to client n.
const PETS: [(&str, &str, &str, PetGender, f64, f64); 10] = [
    ("Rocco", "Perro", "Golden Retriever", PetGender::Male, 4.0, 32.0),
    ("Luna", "Gato", "Siamés", PetGender::Female, 2.0, 4.5),
    ("Max", "Perro", "Labrador", PetGender::Male, 5.0, 28.0),
    ("Bella", "Perro", "Poodle", PetGender::Female, 3.0, 6.0),
    ("Thor", "Perro", "Pastor Alemán", PetGender::Male, 6.0, 35.0),
    ("Mia", "Gato", "Persa", PetGender::Female, 1.0, 3.8),
    ("Toby", "Perro", "Beagle", PetGender::Male, 2.0, 12.0),
    ("Kira", "Perro", "Boxer", PetGender::Female, 4.0, 25.0),
    ("Oliver", "Gato", "Maine Coon", PetGender::Male, 3.0, 8.2),
    ("Nala", "Perro", "Cocker Spaniel", PetGender::Female, 5.0, 14.0),
];

// minutes from seed time, status, reason. Appointment n is for pet n.
const APPOINTMENTS: [(i64, AppointmentStatus, &str); 10] = [
    (60, AppointmentStatus::Confirmed, "Control"),
    (120, AppointmentStatus::Pending, "Vacunación"),
    (180, AppointmentStatus::Confirmed, "Consulta General"),
    (240, AppointmentStatus::Pending, "Desparasitación"),
    (300, AppointmentStatus::Confirmed, "Control Post-Operatorio"),
    (1440, AppointmentStatus::Pending, "Ecografía"),
    (1500, AppointmentStatus::Confirmed, "Análisis de Sangre"),
    (1560, AppointmentStatus::Pending, "Consulta Piel"),
    (1620, AppointmentStatus::Confirmed, "Vacuna Antirrábica"),
    (1680, AppointmentStatus::Pending, "Corte de Uñas"),
];

/// Clients, newest first: client 1 was created last.
pub fn clients(tenant_id: Uuid, now: DateTime<Utc>) -> Vec<Client> {
    CLIENTS
        .iter()
        .enumerate()
        .map(|(i, (first, last, email, phone, address))| Client {
            id: client_id(i + 1),
            tenant_id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            address: Some(address.to_string()),
            created_at: now - Duration::minutes(i as i64),
        })
        .collect()
}

pub fn pets(tenant_id: Uuid, now: DateTime<Utc>) -> Vec<Pet> {
    PETS.iter()
        .enumerate()
        .map(|(i, (name, species, breed, gender, age, weight))| Pet {
            id: pet_id(i + 1),
            tenant_id,
            client_id: client_id(i + 1),
            name: name.to_string(),
            species: species.to_string(),
            breed: Some(breed.to_string()),
            age: *age,
            weight: *weight,
            gender: *gender,
            photo_url: None,
            created_at: now - Duration::minutes(i as i64),
        })
        .collect()
}

/// Appointments relative to `now`, ascending by date-time.
pub fn appointments(tenant_id: Uuid, now: DateTime<Utc>) -> Vec<Appointment> {
    APPOINTMENTS
        .iter()
        .enumerate()
        .map(|(i, (minutes, status, reason))| Appointment {
            id: seed_id(APPOINTMENT_KIND, i + 1),
            tenant_id,
            pet_id: pet_id(i + 1),
            client_id: client_id(i + 1),
            veterinarian_id: None,
            date_time: now + Duration::minutes(*minutes),
            status: *status,
            reason: reason.to_string(),
            notes: None,
            created_at: now,
        })
        .collect()
}

/// One routine vaccination record per seeded pet.
pub fn records(tenant_id: Uuid, now: DateTime<Utc>) -> Vec<MedicalRecord> {
    (1..=PETS.len())
        .map(|n| MedicalRecord {
            id: seed_id(RECORD_KIND, n),
            tenant_id,
            pet_id: pet_id(n),
            veterinarian_id: None,
            date: now,
            diagnosis: "Vacunación Anual".to_string(),
            treatment: "Séxtuple + Rabia".to_string(),
            symptoms: Some("Ninguno, control de rutina".to_string()),
            attachments: Vec::new(),
            created_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_sizes_and_links() {
        let tenant = Uuid::new_v4();
        let now = Utc::now();
        let clients = clients(tenant, now);
        let pets = pets(tenant, now);
        assert_eq!(clients.len(), 10);
        assert_eq!(pets.len(), 10);
        assert!(pets
            .iter()
            .all(|p| clients.iter().any(|c| c.id == p.client_id)));
    }

    #[test]
    fn test_seed_appointments_ascending_with_five_pending() {
        let appointments = appointments(Uuid::new_v4(), Utc::now());
        assert_eq!(appointments.len(), 10);
        assert!(appointments
            .windows(2)
            .all(|w| w[0].date_time < w[1].date_time));
        let pending = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Pending)
            .count();
        assert_eq!(pending, 5);
    }

    #[test]
    fn test_seed_ids_are_stable() {
        assert_eq!(client_id(1), client_id(1));
        assert_ne!(client_id(1), pet_id(1));
    }
}
