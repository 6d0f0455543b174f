//! Invitation templates and message rendering
//!
//! Organizers keep their own templates per channel; built-in defaults cover
//! each channel otherwise. Rendering fills `{{ variable }}` placeholders from
//! the concert and recipient, and builds the deep link the client opens to
//! send the message itself.

use std::collections::HashMap;
use std::sync::OnceLock;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Europe::Paris;
use regex::{Captures, Regex};
use tracing::debug;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::concert::Concert;
use crate::models::template::{
    CreateTemplateRequest, InvitationRecipient, InvitationRequest, MessageChannel, MessageTemplate, RenderedInvitation,
    UpdateTemplateRequest,
};
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::{is_valid_email, non_empty, phone_to_international_digits, public_link};

/// Placeholders filled when rendering an invitation
pub const VARIABLES: &[&str] = &[
    "nom_invite",
    "titre",
    "date",
    "heure",
    "adresse",
    "ville",
    "groupe",
    "organisateur",
    "lien_inscription",
    "places_restantes",
];

const MAX_RECIPIENTS: usize = 500;

const JOURS: [&str; 7] = ["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"];
const MOIS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex is valid"))
}

/// `samedi 14 juin 2025`, in Paris time
pub fn format_date_fr(instant: DateTime<Utc>) -> String {
    let local = instant.with_timezone(&Paris);
    let day = match local.day() {
        1 => "1er".to_string(),
        d => d.to_string(),
    };
    format!(
        "{} {} {} {}",
        JOURS[local.weekday().num_days_from_monday() as usize],
        day,
        MOIS[local.month0() as usize],
        local.year()
    )
}

/// `20h30`, or `20h` on the hour, in Paris time
pub fn format_time_fr(instant: DateTime<Utc>) -> String {
    let local = instant.with_timezone(&Paris);
    match local.minute() {
        0 => format!("{}h", local.hour()),
        m => format!("{}h{:02}", local.hour(), m),
    }
}

/// Replace known placeholders; unknown ones stay verbatim and are reported once each
pub fn render_text(text: &str, variables: &HashMap<&str, String>) -> (String, Vec<String>) {
    let mut unresolved: Vec<String> = Vec::new();
    let rendered = placeholder_regex().replace_all(text, |caps: &Captures| match variables.get(&caps[1]) {
        Some(value) => value.clone(),
        None => {
            if !unresolved.iter().any(|u| u == &caps[1]) {
                unresolved.push(caps[1].to_string());
            }
            caps[0].to_string()
        }
    });
    (rendered.into_owned(), unresolved)
}

/// Built-in template of a channel: `(subject, body)`
pub fn default_template(channel: MessageChannel) -> (Option<&'static str>, &'static str) {
    match channel {
        MessageChannel::Email => (
            Some("Invitation : {{ titre }} le {{ date }}"),
            "Bonjour {{ nom_invite }},\n\n\
             {{ organisateur }} vous invite à un concert chez l'habitant : {{ titre }}, \
             avec {{ groupe }}, le {{ date }} à {{ heure }}, {{ adresse }} {{ ville }}.\n\n\
             Places restantes : {{ places_restantes }}.\n\
             Pour vous inscrire : {{ lien_inscription }}\n\n\
             À bientôt !",
        ),
        MessageChannel::Sms => (
            None,
            "Bonjour {{ nom_invite }}, concert « {{ titre }} » le {{ date }} à {{ heure }} ({{ ville }}). \
             Inscription : {{ lien_inscription }}",
        ),
        MessageChannel::Whatsapp => (
            None,
            "Bonjour {{ nom_invite }} ! 🎶 {{ organisateur }} t'invite au concert « {{ titre }} » \
             avec {{ groupe }}, le {{ date }} à {{ heure }} à {{ ville }}. \
             Il reste {{ places_restantes }} places, inscris-toi ici : {{ lien_inscription }}",
        ),
    }
}

/// Deep link opening the user's own client with the message prefilled
pub fn deep_link(channel: MessageChannel, recipient: Option<&InvitationRecipient>, subject: Option<&str>, body: &str) -> Option<String> {
    let recipient = recipient?;
    match channel {
        MessageChannel::Email => {
            let email = recipient.email.as_deref().map(str::trim).filter(|e| is_valid_email(e))?;
            let (local, domain) = email.rsplit_once('@')?;
            let mut link = format!("mailto:{}@{}?", urlencoding::encode(local), domain);
            if let Some(subject) = subject {
                link.push_str(&format!("subject={}&", urlencoding::encode(subject)));
            }
            link.push_str(&format!("body={}", urlencoding::encode(body)));
            Some(link)
        }
        MessageChannel::Sms => {
            let phone: String = recipient
                .phone
                .as_deref()?
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            Some(format!("sms:{}?body={}", phone, urlencoding::encode(body)))
        }
        MessageChannel::Whatsapp => {
            let digits = phone_to_international_digits(recipient.phone.as_deref()?);
            Some(format!("https://wa.me/{}?text={}", digits, urlencoding::encode(body)))
        }
    }
}

/// Invitation service
#[derive(Clone)]
pub struct InvitationService {
    db: DatabaseService,
    settings: Settings,
}

impl InvitationService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self { db, settings }
    }

    pub async fn create_template(&self, organisateur_id: i64, request: CreateTemplateRequest) -> Result<MessageTemplate> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ConcertError::InvalidInput("Template name is required".to_string()));
        }
        if request.body.trim().is_empty() {
            return Err(ConcertError::InvalidInput("Template body is required".to_string()));
        }
        let subject = match request.channel {
            MessageChannel::Email => non_empty(request.subject),
            _ => None,
        };

        self.db
            .templates
            .create(organisateur_id, CreateTemplateRequest { name, subject, ..request })
            .await
    }

    pub async fn list_templates(&self, organisateur_id: i64) -> Result<Vec<MessageTemplate>> {
        self.db.templates.list_by_organisateur(organisateur_id).await
    }

    pub async fn get_template(&self, organisateur_id: i64, template_id: i64) -> Result<MessageTemplate> {
        self.db
            .templates
            .find(organisateur_id, template_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Template", template_id))
    }

    /// Update name, subject or body; the channel is fixed
    pub async fn update_template(&self, organisateur_id: i64, template_id: i64, request: UpdateTemplateRequest) -> Result<MessageTemplate> {
        let current = self.get_template(organisateur_id, template_id).await?;

        if request.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ConcertError::InvalidInput("Template name cannot be empty".to_string()));
        }
        if request.body.as_ref().is_some_and(|b| b.trim().is_empty()) {
            return Err(ConcertError::InvalidInput("Template body cannot be empty".to_string()));
        }
        let subject = match current.channel {
            // A blank subject clears the stored one.
            MessageChannel::Email => request.subject.map(|s| s.trim().to_string()),
            _ => None,
        };

        self.db
            .templates
            .update(
                organisateur_id,
                template_id,
                UpdateTemplateRequest {
                    name: request.name.map(|n| n.trim().to_string()),
                    subject,
                    body: request.body,
                },
            )
            .await?
            .ok_or_else(|| ConcertError::not_found("Template", template_id))
    }

    pub async fn delete_template(&self, organisateur_id: i64, template_id: i64) -> Result<()> {
        if !self.db.templates.delete(organisateur_id, template_id).await? {
            return Err(ConcertError::not_found("Template", template_id));
        }
        Ok(())
    }

    /// Variables shared by every recipient of a concert invitation
    async fn concert_variables(&self, concert: &Concert) -> Result<HashMap<&'static str, String>> {
        let organisateur = self
            .db
            .organisateurs
            .find_by_id(concert.organisateur_id)
            .await?
            .map(|o| o.name)
            .unwrap_or_default();
        let groupe = match concert.groupe_id {
            Some(id) => self.db.groupes.find_by_id(id).await?.map(|g| g.name).unwrap_or_default(),
            None => String::new(),
        };
        let (confirmed, _) = self.db.inscriptions.seat_counts(concert.id).await?;
        let places_restantes = match concert.capacity {
            Some(cap) => (i64::from(cap) - confirmed).max(0).to_string(),
            None => "illimitées".to_string(),
        };
        let lien = public_link(&self.settings.server.public_base_url, &format!("concerts/{}", concert.id))?;

        let mut variables = HashMap::new();
        variables.insert("titre", concert.title.clone());
        variables.insert("date", concert.starts_at.map(format_date_fr).unwrap_or_default());
        variables.insert("heure", concert.starts_at.map(format_time_fr).unwrap_or_default());
        variables.insert("adresse", concert.address.clone().unwrap_or_default());
        variables.insert("ville", concert.city.clone().unwrap_or_default());
        variables.insert("groupe", groupe);
        variables.insert("organisateur", organisateur);
        variables.insert("lien_inscription", lien.to_string());
        variables.insert("places_restantes", places_restantes);
        variables.insert("nom_invite", String::new());
        Ok(variables)
    }

    /// Render an invitation for an owned concert, once per recipient or once as a preview
    pub async fn render(&self, organisateur_id: i64, concert_id: i64, request: InvitationRequest) -> Result<Vec<RenderedInvitation>> {
        if request.recipients.len() > MAX_RECIPIENTS {
            return Err(ConcertError::InvalidInput(format!("At most {} recipients per request", MAX_RECIPIENTS)));
        }
        let concert = self.db.require_owned_concert(organisateur_id, concert_id).await?;

        let (channel, subject, body) = match (request.template_id, request.channel) {
            (Some(template_id), _) => {
                let template = self.get_template(organisateur_id, template_id).await?;
                (template.channel, template.subject, template.body)
            }
            (None, Some(channel)) => {
                let (subject, body) = default_template(channel);
                (channel, subject.map(str::to_string), body.to_string())
            }
            (None, None) => {
                return Err(ConcertError::InvalidInput("Either template_id or channel is required".to_string()));
            }
        };

        let mut variables = self.concert_variables(&concert).await?;
        let recipients: Vec<Option<InvitationRecipient>> = if request.recipients.is_empty() {
            vec![None]
        } else {
            request.recipients.into_iter().map(Some).collect()
        };

        let rendered = recipients
            .into_iter()
            .map(|recipient| {
                let name = recipient.as_ref().and_then(|r| r.name.clone()).unwrap_or_default();
                variables.insert("nom_invite", name);

                let (body, mut unresolved) = render_text(&body, &variables);
                let subject = subject.as_deref().map(|s| {
                    let (text, missing) = render_text(s, &variables);
                    for m in missing {
                        if !unresolved.contains(&m) {
                            unresolved.push(m);
                        }
                    }
                    text
                });
                let link = deep_link(channel, recipient.as_ref(), subject.as_deref(), &body);

                RenderedInvitation {
                    recipient: recipient.and_then(|r| r.name.or(r.email).or(r.phone)),
                    channel,
                    subject,
                    body,
                    link,
                    unresolved,
                }
            })
            .collect::<Vec<_>>();

        debug!(concert_id, count = rendered.len(), channel = ?channel, "Invitations rendered");
        Ok(rendered)
    }
}
