use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::repo_types::Identity,
    error::AppError,
    listings::{
        dto::ListingForm,
        repo::ListingRepo,
        repo_types::{Listing, ListingFields},
    },
};

fn parse_number<T>(raw: &str, field: &str) -> Result<T, AppError>
where
    T: FromStr + Default + PartialOrd,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    let value = raw
        .parse::<T>()
        .map_err(|_| AppError::validation(format!("{field} must be a number.")))?;
    if value < T::default() {
        return Err(AppError::validation(format!("{field} cannot be negative.")));
    }
    Ok(value)
}

/// Rent is stored as NUMERIC(12, 2).
fn parse_rent(raw: &str) -> Result<Decimal, AppError> {
    let rent = parse_number::<Decimal>(raw, "Rent")?;
    if rent.normalize().scale() > 2 {
        return Err(AppError::validation("Rent can have at most two decimal places."));
    }
    if rent >= Decimal::new(10_000_000_000, 0) {
        return Err(AppError::validation("Rent must be below 10,000,000,000."));
    }
    Ok(rent)
}

/// Presence checks on required fields; blank numbers become zero.
pub fn parse_fields(form: ListingForm) -> Result<ListingFields, AppError> {
    let title = form.title.trim().to_string();
    let location = form.location.trim().to_string();
    if title.is_empty() || location.is_empty() {
        return Err(AppError::validation("Title and location are required."));
    }
    let image = form.image.trim();
    Ok(ListingFields {
        title,
        location,
        rent: parse_rent(&form.rent)?,
        size: parse_number::<i32>(&form.size, "Size")?,
        capacity: parse_number::<i32>(&form.capacity, "Capacity")?,
        description: form.description.trim().to_string(),
        image: (!image.is_empty()).then(|| image.to_string()),
        occupied: form.occupied.is_some_and(|v| !v.is_empty() && v != "false"),
    })
}

pub async fn create(
    listings: &dyn ListingRepo,
    owner: &Identity,
    form: ListingForm,
) -> Result<Listing, AppError> {
    let fields = parse_fields(form)?;
    let listing = listings.create(owner.id, fields).await?;
    info!(listing_id = %listing.id, owner_id = %owner.id, "listing created");
    Ok(listing)
}

/// Fetches a listing the actor owns.
pub async fn owned(
    listings: &dyn ListingRepo,
    actor: &Identity,
    id: Uuid,
) -> Result<Listing, AppError> {
    let listing = listings.find(id).await?.ok_or(AppError::NotFound("Listing"))?;
    if listing.owner_id != actor.id {
        warn!(listing_id = %id, actor_id = %actor.id, owner_id = %listing.owner_id, "not the listing owner");
        return Err(AppError::denied("You can only manage your own listings."));
    }
    Ok(listing)
}

pub async fn update(
    listings: &dyn ListingRepo,
    actor: &Identity,
    id: Uuid,
    form: ListingForm,
) -> Result<Listing, AppError> {
    owned(listings, actor, id).await?;
    let fields = parse_fields(form)?;
    let listing = listings
        .update(id, fields)
        .await?
        .ok_or(AppError::NotFound("Listing"))?;
    info!(listing_id = %id, "listing updated");
    Ok(listing)
}

pub async fn delete(
    listings: &dyn ListingRepo,
    actor: &Identity,
    id: Uuid,
) -> Result<(), AppError> {
    owned(listings, actor, id).await?;
    if !listings.delete(id).await? {
        return Err(AppError::NotFound("Listing"));
    }
    info!(listing_id = %id, owner_id = %actor.id, "listing deleted");
    Ok(())
}
