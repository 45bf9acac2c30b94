use crate::appointment::{Appointment, NewAppointment};
use crate::repositories::StoreResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Storage of appointments.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Assigns the next identifier and stores the appointment.
    async fn insert(&self, appointment: NewAppointment) -> StoreResult<Appointment>;

    /// All appointments by ascending identifier.
    async fn list(&self) -> StoreResult<Vec<Appointment>>;
}

#[derive(Default)]
struct Book {
    last_id: i64,
    entries: BTreeMap<i64, Appointment>,
}

/// Process-local appointment book. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    book: RwLock<Book>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let mut book = self.book.write().await;
        book.last_id += 1;
        let stored = Appointment {
            id: book.last_id,
            patient_name: appointment.patient_name.into_inner(),
            date: appointment.date,
            time: appointment.time,
        };
        book.entries.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> StoreResult<Vec<Appointment>> {
        let book = self.book.read().await;
        Ok(book.entries.values().cloned().collect())
    }
}
