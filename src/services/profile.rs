//! Group and organizer profiles, plus public group discovery

use tracing::{debug, warn};
use crate::database::DatabaseService;
use crate::models::groupe::{Groupe, GroupeSearchQuery, GroupeSearchResult, UpsertGroupeRequest};
use crate::models::organisateur::{Organisateur, UpsertOrganisateurRequest};
use crate::models::user::{User, UserRole};
use crate::services::geocoding::GeocodingService;
use crate::utils::errors::{ConcertError, Result};
use crate::utils::geo::GeoPoint;
use crate::utils::helpers::{is_valid_email, is_valid_phone, non_empty};

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Profile and search service
#[derive(Clone)]
pub struct ProfileService {
    db: DatabaseService,
    geocoder: Option<GeocodingService>,
}

fn require_role(user: &User, role: UserRole) -> Result<()> {
    if user.role != role {
        return Err(ConcertError::PermissionDenied(format!("This profile requires the {:?} role", role)));
    }
    Ok(())
}

/// Trim and check a group profile submission
pub fn normalize_groupe(request: UpsertGroupeRequest) -> Result<UpsertGroupeRequest> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ConcertError::InvalidInput("Name is required".to_string()));
    }

    match (request.latitude, request.longitude) {
        (Some(lat), Some(lng)) if !GeoPoint::new(lat, lng).is_valid() => {
            return Err(ConcertError::InvalidInput("Coordinates out of range".to_string()));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ConcertError::InvalidInput("Latitude and longitude go together".to_string()));
        }
        _ => {}
    }

    if let (Some(min), Some(max)) = (request.price_min, request.price_max) {
        if min > max {
            return Err(ConcertError::InvalidInput("price_min cannot exceed price_max".to_string()));
        }
    }
    if request.price_min.is_some_and(|p| p < 0) || request.price_max.is_some_and(|p| p < 0) {
        return Err(ConcertError::InvalidInput("Prices cannot be negative".to_string()));
    }

    let contact_email = non_empty(request.contact_email).map(|e| e.to_lowercase());
    if let Some(email) = &contact_email {
        if !is_valid_email(email) {
            return Err(ConcertError::InvalidInput(format!("Invalid contact email: {}", email)));
        }
    }

    let mut genres: Vec<String> = request
        .genres
        .into_iter()
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();
    genres.sort();
    genres.dedup();

    Ok(UpsertGroupeRequest {
        name,
        bio: non_empty(request.bio),
        genres,
        city: non_empty(request.city),
        contact_email,
        website: non_empty(request.website),
        ..request
    })
}

/// Filter and order published groups for a search.
///
/// With a point every result carries its distance and results are sorted by
/// it; groups without coordinates drop out. Otherwise results are by name.
pub fn rank_groupes(groupes: Vec<Groupe>, query: &GroupeSearchQuery) -> Result<Vec<GroupeSearchResult>> {
    let origin = match (query.lat, query.lng, query.radius_km) {
        (Some(lat), Some(lng), Some(radius)) => {
            let point = GeoPoint::new(lat, lng);
            if !point.is_valid() {
                return Err(ConcertError::InvalidInput("Coordinates out of range".to_string()));
            }
            if !(radius > 0.0 && radius.is_finite()) {
                return Err(ConcertError::InvalidInput("radius_km must be positive".to_string()));
            }
            Some((point, radius))
        }
        (None, None, None) => None,
        _ => {
            return Err(ConcertError::InvalidInput("lat, lng and radius_km must be given together".to_string()));
        }
    };
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    let text = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let mut results: Vec<GroupeSearchResult> = groupes
        .into_iter()
        .filter(|g| text.map_or(true, |q| g.matches_text(q)))
        .filter(|g| query.genre.as_deref().map_or(true, |genre| g.has_genre(genre)))
        .filter_map(|groupe| match origin {
            Some((point, radius)) => {
                let distance = groupe.location()?.distance_km(&point);
                (distance <= radius).then_some(GroupeSearchResult { groupe, distance_km: Some(distance) })
            }
            None => Some(GroupeSearchResult { groupe, distance_km: None }),
        })
        .collect();

    if origin.is_some() {
        results.sort_by(|a, b| a.distance_km.partial_cmp(&b.distance_km).unwrap_or(std::cmp::Ordering::Equal));
    } else {
        results.sort_by(|a, b| a.groupe.name.to_lowercase().cmp(&b.groupe.name.to_lowercase()));
    }
    results.truncate(limit);

    Ok(results)
}

impl ProfileService {
    pub fn new(db: DatabaseService, geocoder: Option<GeocodingService>) -> Self {
        Self { db, geocoder }
    }

    pub async fn get_own_groupe(&self, user: &User) -> Result<Groupe> {
        require_role(user, UserRole::Groupe)?;
        self.db
            .groupes
            .find_by_user_id(user.id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Groupe", format!("user {}", user.id)))
    }

    /// Create or replace the caller's group profile, geocoding the city when needed
    pub async fn upsert_groupe(&self, user: &User, request: UpsertGroupeRequest) -> Result<Groupe> {
        require_role(user, UserRole::Groupe)?;
        let mut request = normalize_groupe(request)?;

        if request.latitude.is_none() {
            if let (Some(geocoder), Some(city)) = (&self.geocoder, request.city.as_deref()) {
                match geocoder.geocode(city).await {
                    Ok(point) => {
                        debug!(city = city, lat = point.latitude, lng = point.longitude, "Group location geocoded");
                        request.latitude = Some(point.latitude);
                        request.longitude = Some(point.longitude);
                    }
                    Err(e) => {
                        warn!(city = city, error = %e, "Geocoding failed, keeping profile without coordinates");
                    }
                }
            }
        }

        self.db.groupes.upsert_for_user(user.id, request).await
    }

    pub async fn get_own_organisateur(&self, user: &User) -> Result<Organisateur> {
        require_role(user, UserRole::Organisateur)?;
        self.db
            .organisateurs
            .find_by_user_id(user.id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Organisateur", format!("user {}", user.id)))
    }

    pub async fn upsert_organisateur(&self, user: &User, request: UpsertOrganisateurRequest) -> Result<Organisateur> {
        require_role(user, UserRole::Organisateur)?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ConcertError::InvalidInput("Name is required".to_string()));
        }
        let phone = non_empty(request.phone);
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(ConcertError::InvalidInput(format!("Invalid phone number: {}", phone)));
            }
        }

        self.db
            .organisateurs
            .upsert_for_user(user.id, UpsertOrganisateurRequest { name, city: non_empty(request.city), phone })
            .await
    }

    /// Public read; unpublished groups are not found
    pub async fn get_public_groupe(&self, groupe_id: i64) -> Result<Groupe> {
        self.db
            .groupes
            .find_by_id(groupe_id)
            .await?
            .filter(|g| g.is_published)
            .ok_or_else(|| ConcertError::not_found("Groupe", groupe_id))
    }

    pub async fn search(&self, query: GroupeSearchQuery) -> Result<Vec<GroupeSearchResult>> {
        // Validate before querying.
        rank_groupes(Vec::new(), &query)?;
        let genre = query.genre.as_deref().map(str::trim).filter(|g| !g.is_empty());
        let groupes = self.db.groupes.list_published(genre).await?;
        rank_groupes(groupes, &query)
    }
}
