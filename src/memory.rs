//! In-memory store backing `AppState::fake()`.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    activity::{
        repo::ActivityRepo,
        repo_types::{ListingView, Message, NewMessage},
    },
    auth::{
        repo::{DuplicateUser, UserRepo},
        repo_types::{Identity, NewIdentity, Profile},
    },
    bookings::{
        repo::BookingRepo,
        repo_types::{BookingRequest, BookingStatus},
    },
    listings::{
        repo::ListingRepo,
        repo_types::{Listing, ListingFields},
    },
};

/// Rows are kept in insertion order; "newest first" reads iterate backwards.
#[derive(Default)]
struct Tables {
    users: Vec<Identity>,
    listings: Vec<Listing>,
    bookings: Vec<BookingRequest>,
    views: Vec<ListingView>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Tables {
    fn drop_listing(&mut self, id: Uuid) -> bool {
        let before = self.listings.len();
        self.listings.retain(|l| l.id != id);
        self.bookings.retain(|b| b.listing_id != id);
        self.views.retain(|v| v.listing_id != id);
        for m in self.messages.iter_mut().filter(|m| m.listing_id == Some(id)) {
            m.listing_id = None;
        }
        self.listings.len() != before
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Identity>> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        let email = email.to_lowercase();
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.email.as_deref().map(str::to_lowercase).as_deref() == Some(email.as_str()))
            .cloned())
    }

    async fn create(&self, new: NewIdentity) -> anyhow::Result<Identity> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(DuplicateUser::Username.into());
        }
        if let Some(email) = &new.email {
            let taken = t
                .users
                .iter()
                .any(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)));
            if taken {
                return Err(DuplicateUser::Email.into());
            }
        }
        let identity = Identity {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            is_staff: new.is_staff,
            created_at: OffsetDateTime::now_utc(),
            profile: new.profile.map(|p| Profile { role: p.role, phone: p.phone, verified: false }),
        };
        t.users.push(identity.clone());
        Ok(identity)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Identity>> {
        Ok(self.lock().users.iter().rev().cloned().collect())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> anyhow::Result<bool> {
        let mut t = self.lock();
        let profile = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .and_then(|u| u.profile.as_mut());
        Ok(match profile {
            Some(p) => {
                p.verified = verified;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.lock();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Ok(false);
        }
        let owned: Vec<Uuid> = t
            .listings
            .iter()
            .filter(|l| l.owner_id == id)
            .map(|l| l.id)
            .collect();
        for listing_id in owned {
            t.drop_listing(listing_id);
        }
        t.bookings.retain(|b| b.renter_id != id && b.owner_id != id);
        t.messages.retain(|m| m.sender_id != id && m.recipient_id != id);
        for v in t.views.iter_mut().filter(|v| v.viewer_id == Some(id)) {
            v.viewer_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl ListingRepo for MemoryStore {
    async fn create(&self, owner_id: Uuid, f: ListingFields) -> anyhow::Result<Listing> {
        let listing = Listing {
            id: Uuid::new_v4(),
            owner_id,
            title: f.title,
            location: f.location,
            rent: f.rent,
            size: f.size,
            capacity: f.capacity,
            description: f.description,
            image: f.image,
            created_at: OffsetDateTime::now_utc(),
            occupied: f.occupied,
        };
        self.lock().listings.push(listing.clone());
        Ok(listing)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        Ok(self.lock().listings.iter().find(|l| l.id == id).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        Ok(self.lock().listings.iter().rev().cloned().collect())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Listing>> {
        Ok(self
            .lock()
            .listings
            .iter()
            .rev()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, f: ListingFields) -> anyhow::Result<Option<Listing>> {
        let mut t = self.lock();
        let Some(l) = t.listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        l.title = f.title;
        l.location = f.location;
        l.rent = f.rent;
        l.size = f.size;
        l.capacity = f.capacity;
        l.description = f.description;
        l.image = f.image;
        l.occupied = f.occupied;
        Ok(Some(l.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.lock().drop_listing(id))
    }
}

#[async_trait]
impl BookingRepo for MemoryStore {
    async fn create(
        &self,
        renter_id: Uuid,
        owner_id: Uuid,
        listing_id: Uuid,
    ) -> anyhow::Result<BookingRequest> {
        let now = OffsetDateTime::now_utc();
        let request = BookingRequest {
            id: Uuid::new_v4(),
            renter_id,
            owner_id,
            listing_id,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.lock().bookings.push(request.clone());
        Ok(request)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<BookingRequest>> {
        Ok(self.lock().bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> anyhow::Result<Option<BookingRequest>> {
        let mut t = self.lock();
        Ok(t.bookings.iter_mut().find(|b| b.id == id).map(|b| {
            b.status = status;
            b.updated_at = OffsetDateTime::now_utc();
            b.clone()
        }))
    }

    async fn list_pending_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        Ok(self.select(|b| b.owner_id == owner_id && b.status == BookingStatus::Pending))
    }

    async fn list_resolved_for_renter(
        &self,
        renter_id: Uuid,
    ) -> anyhow::Result<Vec<BookingRequest>> {
        Ok(self.select(|b| b.renter_id == renter_id && b.status != BookingStatus::Pending))
    }

    async fn list_for_renter(&self, renter_id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        Ok(self.select(|b| b.renter_id == renter_id))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        Ok(self.select(|b| b.owner_id == owner_id))
    }
}

impl MemoryStore {
    fn select(&self, keep: impl Fn(&BookingRequest) -> bool) -> Vec<BookingRequest> {
        self.lock().bookings.iter().rev().filter(|b| keep(b)).cloned().collect()
    }
}

#[async_trait]
impl ActivityRepo for MemoryStore {
    async fn record_view(
        &self,
        listing_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> anyhow::Result<ListingView> {
        let view = ListingView {
            id: Uuid::new_v4(),
            listing_id,
            viewer_id,
            viewed_at: OffsetDateTime::now_utc(),
        };
        self.lock().views.push(view.clone());
        Ok(view)
    }

    async fn view_counts(&self, listing_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, i64>> {
        let mut counts = HashMap::new();
        for v in self.lock().views.iter().filter(|v| listing_ids.contains(&v.listing_id)) {
            *counts.entry(v.listing_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn send_message(&self, new: NewMessage) -> anyhow::Result<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            listing_id: new.listing_id,
            body: new.body,
            sent_at: OffsetDateTime::now_utc(),
        };
        self.lock().messages.push(message.clone());
        Ok(message)
    }

    async fn messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .rev()
            .filter(|m| m.sender_id == user_id || m.recipient_id == user_id)
            .cloned()
            .collect())
    }
}
