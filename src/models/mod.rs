//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod groupe;
pub mod organisateur;
pub mod concert;
pub mod inscription;
pub mod contact;
pub mod share_token;
pub mod review;
pub mod template;
pub mod devis;

// Re-export commonly used models
pub use user::{User, UserRole, UpsertUserRequest};
pub use groupe::{Groupe, UpsertGroupeRequest, GroupeSearchQuery, GroupeSearchResult};
pub use organisateur::{Organisateur, UpsertOrganisateurRequest};
pub use concert::{Concert, ConcertStatus, ConcertSummary, CreateConcertRequest, UpdateConcertRequest, ChangeConcertStatusRequest};
pub use inscription::{
    Inscription, InscriptionStatus, InscriptionReceipt, CreateInscriptionRequest, UpdateInscriptionRequest,
    ChangeInscriptionStatusRequest, ManagementTokenQuery,
};
pub use contact::{Contact, ContactSource, NewContact, ImportReport};
pub use share_token::{ShareToken, ShareTokenRefusal, CreateShareTokenRequest, ShareTokenView, SharePreview};
pub use review::{Review, CreateReviewRequest, ReviewList};
pub use template::{MessageChannel, MessageTemplate, CreateTemplateRequest, UpdateTemplateRequest, InvitationRecipient, InvitationRequest, RenderedInvitation};
pub use devis::{Devis, DevisStatus, DevisParty, CreateDevisRequest};
