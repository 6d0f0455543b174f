//! Group search, reviews, quote requests and invitations against PostgreSQL

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serial_test::serial;
use concert_chaussettes::models::concert::CreateConcertRequest;
use concert_chaussettes::models::devis::{CreateDevisRequest, DevisStatus};
use concert_chaussettes::models::groupe::GroupeSearchQuery;
use concert_chaussettes::models::review::CreateReviewRequest;
use concert_chaussettes::models::template::{
    CreateTemplateRequest, InvitationRecipient, InvitationRequest, MessageChannel, UpdateTemplateRequest,
};
use concert_chaussettes::models::user::UserRole;
use concert_chaussettes::ConcertError;
use helpers::*;

const LYON: (f64, f64) = (45.7640, 4.8357);
const VILLEURBANNE: (f64, f64) = (45.7719, 4.8902);
const PARIS: (f64, f64) = (48.8566, 2.3522);

fn devis_request(groupe_id: i64) -> CreateDevisRequest {
    CreateDevisRequest {
        groupe_id,
        concert_id: None,
        event_date: Utc::now() + Duration::days(30),
        budget: Some(400),
        message: "Un samedi soir dans notre salon ?".to_string(),
    }
}

#[tokio::test]
#[serial]
async fn test_search_by_radius_orders_by_distance() {
    let Some(ctx) = TestContext::new().await else { return };
    ctx.groupe("g-villeurbanne", "Les Tilleuls", Some(VILLEURBANNE), &["Jazz"]).await;
    ctx.groupe("g-lyon", "Trio Croix-Rousse", Some(LYON), &["jazz", "swing"]).await;
    ctx.groupe("g-paris", "Paname Swing", Some(PARIS), &["swing"]).await;
    ctx.groupe("g-nowhere", "Sans Adresse", None, &["jazz"]).await;

    let profiles = &ctx.state.services.profile_service;
    let nearby = profiles
        .search(GroupeSearchQuery { lat: Some(LYON.0), lng: Some(LYON.1), radius_km: Some(20.0), ..Default::default() })
        .await
        .unwrap();
    let names: Vec<&str> = nearby.iter().map(|r| r.groupe.name.as_str()).collect();
    assert_eq!(names, vec!["Trio Croix-Rousse", "Les Tilleuls"]);
    assert!(nearby[0].distance_km.unwrap() < 0.1);

    let jazz = profiles
        .search(GroupeSearchQuery { genre: Some("jazz".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(jazz.len(), 3);
    assert!(jazz.iter().all(|r| r.distance_km.is_none()));

    let partial = profiles
        .search(GroupeSearchQuery { lat: Some(LYON.0), ..Default::default() })
        .await;
    assert_matches!(partial, Err(ConcertError::InvalidInput(_)));
}

#[tokio::test]
#[serial]
async fn test_reviews_are_unique_per_concert_and_averaged() {
    let Some(ctx) = TestContext::new().await else { return };
    let organisateur = ctx.organisateur("org-reviews").await;
    let (_, groupe) = ctx.groupe("g-reviewed", "Trio Croix-Rousse", Some(LYON), &["jazz"]).await;
    let (_, other) = ctx.groupe("g-other", "Paname Swing", Some(PARIS), &["swing"]).await;

    let concerts = &ctx.state.services.concert_service;
    let played = concerts
        .create(
            organisateur.id,
            CreateConcertRequest { groupe_id: Some(groupe.id), ..concert_request("Jazz au salon", Some(20)) },
        )
        .await
        .unwrap();

    let reviews = &ctx.state.services.review_service;
    let review = |rating, concert_id| CreateReviewRequest { rating, comment: Some("Super soirée".to_string()), concert_id };

    reviews.create(organisateur.id, groupe.id, review(5, Some(played.id))).await.unwrap();
    reviews.create(organisateur.id, groupe.id, review(3, None)).await.unwrap();

    let duplicate = reviews.create(organisateur.id, groupe.id, review(4, Some(played.id))).await;
    assert_matches!(duplicate, Err(ConcertError::Conflict(_)));

    let unrelated = reviews.create(organisateur.id, other.id, review(4, Some(played.id))).await;
    assert_matches!(unrelated, Err(ConcertError::InvalidInput(_)));

    let list = reviews.list(groupe.id).await.unwrap();
    assert_eq!(list.review_count, 2);
    assert_eq!(list.average_rating, Some(4.0));

    let public = ctx.state.services.profile_service.get_public_groupe(groupe.id).await.unwrap();
    assert_eq!(public.review_count, 2);
    assert_eq!(public.average_rating, Some(4.0));
}

#[tokio::test]
#[serial]
async fn test_devis_lifecycle() {
    let Some(ctx) = TestContext::new().await else { return };
    let organisateur = ctx.organisateur("org-devis").await;
    let organisateur_user = ctx.user("org-devis", UserRole::Organisateur).await;
    let (groupe_user, groupe) = ctx.groupe("g-devis", "Trio Croix-Rousse", Some(LYON), &["jazz"]).await;
    let (stranger, _) = ctx.groupe("g-stranger", "Paname Swing", Some(PARIS), &["swing"]).await;
    let admin = ctx.user("admin", UserRole::Admin).await;

    let devis_service = &ctx.state.services.devis_service;

    let past = CreateDevisRequest { event_date: Utc::now() - Duration::days(1), ..devis_request(groupe.id) };
    assert_matches!(devis_service.create(organisateur.id, past).await, Err(ConcertError::InvalidInput(_)));
    let negative = CreateDevisRequest { budget: Some(-1), ..devis_request(groupe.id) };
    assert_matches!(devis_service.create(organisateur.id, negative).await, Err(ConcertError::InvalidInput(_)));

    let devis = devis_service.create(organisateur.id, devis_request(groupe.id)).await.unwrap();
    assert_eq!(devis.status, DevisStatus::Pending);

    assert_eq!(devis_service.list(&organisateur_user).await.unwrap().len(), 1);
    assert_eq!(devis_service.list(&groupe_user).await.unwrap().len(), 1);
    assert!(devis_service.list(&stranger).await.unwrap().is_empty());
    assert_matches!(devis_service.list(&admin).await, Err(ConcertError::PermissionDenied(_)));

    assert_matches!(
        devis_service.transition(&stranger, devis.id, DevisStatus::Accepted).await,
        Err(ConcertError::NotFound { .. })
    );
    assert_matches!(
        devis_service.transition(&organisateur_user, devis.id, DevisStatus::Accepted).await,
        Err(ConcertError::InvalidStateTransition { .. })
    );

    let accepted = devis_service.transition(&groupe_user, devis.id, DevisStatus::Accepted).await.unwrap();
    assert_eq!(accepted.status, DevisStatus::Accepted);

    assert_matches!(
        devis_service.transition(&organisateur_user, devis.id, DevisStatus::Cancelled).await,
        Err(ConcertError::InvalidStateTransition { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_templates_and_invitation_rendering() {
    let Some(ctx) = TestContext::new().await else { return };
    let organisateur = ctx.organisateur("org-invite").await;
    let intruder = ctx.organisateur("org-intruder").await;
    let concert = ctx.published_concert(organisateur.id, Some(30)).await;

    let invitations = &ctx.state.services.invitation_service;
    let sms = invitations
        .create_template(
            organisateur.id,
            CreateTemplateRequest {
                name: "  Relance  ".to_string(),
                channel: MessageChannel::Sms,
                subject: Some("ignored".to_string()),
                body: "Salut {{ nom_invite }}, {{ titre }} : {{ places_restantes }} places. {{ code_promo }}".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(sms.name, "Relance");
    assert_eq!(sms.subject, None);

    assert_matches!(
        invitations.get_template(intruder.id, sms.id).await,
        Err(ConcertError::NotFound { .. })
    );

    let renamed = invitations
        .update_template(
            organisateur.id,
            sms.id,
            UpdateTemplateRequest { name: Some("Relance J-7".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Relance J-7");
    assert_eq!(renamed.body, sms.body);

    let rendered = invitations
        .render(
            organisateur.id,
            concert.id,
            InvitationRequest {
                template_id: Some(sms.id),
                channel: None,
                recipients: vec![
                    InvitationRecipient { name: Some("Alice".to_string()), email: None, phone: Some("06 12 34 56 78".to_string()) },
                    InvitationRecipient { name: Some("Bob".to_string()), email: Some("bob@example.com".to_string()), phone: None },
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].body, "Salut Alice, Concert au salon : 30 places. {{ code_promo }}");
    assert_eq!(rendered[0].unresolved, vec!["code_promo".to_string()]);
    assert!(rendered[0].link.as_deref().unwrap().starts_with("sms:0612345678?body="));
    assert_eq!(rendered[1].link, None);

    let preview = invitations
        .render(
            organisateur.id,
            concert.id,
            InvitationRequest { template_id: None, channel: Some(MessageChannel::Email), recipients: Vec::new() },
        )
        .await
        .unwrap();
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].recipient, None);
    assert!(preview[0].subject.as_deref().unwrap().starts_with("Invitation : Concert au salon le "));
    assert!(preview[0].body.contains(&format!("https://concerts.example.fr/concerts/{}", concert.id)));
    assert!(preview[0].unresolved.is_empty());

    assert_matches!(
        invitations
            .render(intruder.id, concert.id, InvitationRequest { template_id: None, channel: Some(MessageChannel::Sms), recipients: Vec::new() })
            .await,
        Err(ConcertError::NotFound { .. })
    );

    invitations.delete_template(organisateur.id, sms.id).await.unwrap();
    assert_matches!(
        invitations.delete_template(organisateur.id, sms.id).await,
        Err(ConcertError::NotFound { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_email_template_subject_can_be_cleared() {
    let Some(ctx) = TestContext::new().await else { return };
    let organisateur = ctx.organisateur("org-subject").await;
    let invitations = &ctx.state.services.invitation_service;

    let template = invitations
        .create_template(
            organisateur.id,
            CreateTemplateRequest {
                name: "Annonce".to_string(),
                channel: MessageChannel::Email,
                subject: Some("{{ titre }} approche".to_string()),
                body: "Bonjour {{ nom_invite }}".to_string(),
            },
        )
        .await
        .unwrap();

    let renamed = invitations
        .update_template(
            organisateur.id,
            template.id,
            UpdateTemplateRequest { name: Some("Annonce J-7".to_string()), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(renamed.subject.as_deref(), Some("{{ titre }} approche"));

    let cleared = invitations
        .update_template(
            organisateur.id,
            template.id,
            UpdateTemplateRequest { subject: Some(String::new()), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(cleared.subject, None);
    assert_eq!(cleared.name, "Annonce J-7");
}
