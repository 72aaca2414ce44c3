use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::models::{ticket_id, ActivityLog, NewTicket, Ticket, TicketStatus, User};
use crate::database::store::{LogStore, StoreError, TicketStore, UserStore};

/// In-process backend used for development and tests
#[derive(Default)]
pub struct MemoryStore {
    // Tickets are never physically removed, so the vector length doubles as the id sequence
    tickets: RwLock<Vec<Ticket>>,
    users: RwLock<HashMap<String, User>>,
    logs: RwLock<Vec<ActivityLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert(&self, new: NewTicket) -> Result<Ticket, StoreError> {
        let mut tickets = self.tickets.write().await;
        let ticket = Ticket::from_new(ticket_id(tickets.len() as u64 + 1), new);
        tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let tickets = self.tickets.read().await;
        Ok(tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, StoreError> {
        let tickets = self.tickets.read().await;
        Ok(tickets.iter().filter(|t| t.status == status).cloned().collect())
    }

    async fn replace_active(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut tickets = self.tickets.write().await;
        let stored = tickets
            .iter_mut()
            .find(|t| t.id == ticket.id)
            .ok_or_else(|| StoreError::NotFound(format!("ticket {}", ticket.id)))?;

        if stored.is_deleted() {
            return Err(StoreError::Conflict(format!("ticket {} is deleted", ticket.id)));
        }

        *stored = ticket.clone();
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::AlreadyExists(format!("user {}", user.username)));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.username) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("user {}", user.username))),
        }
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, entry: &ActivityLog) -> Result<(), StoreError> {
        self.logs.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<ActivityLog>, StoreError> {
        let logs = self.logs.read().await;
        Ok(logs.iter().rev().cloned().collect())
    }

    async fn get_log(&self, id: &str) -> Result<Option<ActivityLog>, StoreError> {
        let logs = self.logs.read().await;
        Ok(logs.iter().find(|l| l.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{LogAction, TicketType};
    use chrono::Utc;

    fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: "desc".to_string(),
            street_location: "Jakarta".to_string(),
            price: 10.0,
            latitude: "-6.2".to_string(),
            longitude: "106.8".to_string(),
            ticket_type: TicketType::Place,
            start_datetime: None,
            end_datetime: None,
            creator: "alice".to_string(),
            image_url: "http://localhost/uploads/x.png".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert(new_ticket("a")).await.unwrap();
        let b = store.insert(new_ticket("b")).await.unwrap();

        assert_eq!(a.id, "TIC000001");
        assert_eq!(b.id, "TIC000002");
        assert_eq!(a.status, TicketStatus::Active);
    }

    #[tokio::test]
    async fn concurrent_inserts_never_share_an_id() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(new_ticket(&format!("t{}", i))).await.unwrap().id })
            })
            .collect();

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn replace_refuses_deleted_tickets() {
        let store = MemoryStore::new();
        let mut t = store.insert(new_ticket("a")).await.unwrap();

        t.status = TicketStatus::Deleted;
        store.replace_active(&t).await.unwrap();

        t.status = TicketStatus::Active;
        assert!(matches!(store.replace_active(&t).await, Err(StoreError::Conflict(_))));
        assert!(store.get(&t.id).await.unwrap().unwrap().is_deleted());

        let mut ghost = t.clone();
        ghost.id = "TIC999999".to_string();
        assert!(matches!(store.replace_active(&ghost).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let store = MemoryStore::new();
        let user = User {
            username: "alice".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.create_user(&user).await.unwrap();
        assert!(matches!(store.create_user(&user).await, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn logs_are_listed_newest_first() {
        let store = MemoryStore::new();
        let first = ActivityLog::new(LogAction::TicketCreated, "TIC000001", "alice");
        let second = ActivityLog::new(LogAction::TicketDeleted, "TIC000001", "alice");
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let logs = store.list_logs().await.unwrap();
        assert_eq!(logs[0].id, second.id);
        assert_eq!(store.get_log(&first.id).await.unwrap(), Some(first));
    }
}
