//! Database repositories module
//!
//! This module contains all repository implementations for data access

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

// Re-export repositories
pub use user::UserRepository;
pub use groupe::GroupeRepository;
pub use organisateur::OrganisateurRepository;
pub use concert::ConcertRepository;
pub use inscription::InscriptionRepository;
pub use contact::ContactRepository;
pub use share_token::ShareTokenRepository;
pub use review::ReviewRepository;
pub use template::TemplateRepository;
pub use devis::DevisRepository;
