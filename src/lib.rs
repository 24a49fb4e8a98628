//! # edu-social
//!
//! Backend for a student social network, centred on authenticated
//! real-time group chat:
//! - RESTful HTTP API for accounts and group lifecycle
//! - WebSocket endpoint where clients join rooms and post messages
//! - PostgreSQL for accounts, groups, membership and message history
//!
//! ## Architecture
//!
//! - **Domain Layer**: Entities, repository traits, the room broadcaster seam
//! - **Application Layer**: Auth, group and message services plus DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories, migrations, metrics
//! - **Presentation Layer**: HTTP handlers, middleware and the WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! edu_social/
//! +-- config/         Configuration management
//! +-- domain/         Entities and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database and metrics implementations
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
