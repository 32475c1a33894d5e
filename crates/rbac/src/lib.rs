//! # Warden RBAC
//!
//! Role-Based Access Control for Warden.
//!
//! ## Components
//!
//! - `RoleManager` - Role definitions, inheritance and effective permissions

pub mod role_manager;

pub use role_manager::RoleManager;
