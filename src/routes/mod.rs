/// Router Module Index
///
/// Splits the navigable paths by who may reach them. Each module's router is wrapped
/// in its own `RouteGuard` in `create_router`, so access control is visible at the
/// module boundary instead of being repeated inside handlers.

/// Paths open to every visitor, signed in or not.
pub mod public;

/// Paths requiring any signed-in session.
pub mod authenticated;

/// Paths restricted to the blood-bank role.
pub mod blood_bank;

/// Paths restricted to the donor role.
pub mod donor;

/// Paths restricted to the admin role.
pub mod admin;
