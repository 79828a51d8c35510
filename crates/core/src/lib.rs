//! Flora Bella Core - Storefront gate domain logic.
//!
//! This crate holds the logic behind the two stateful storefront flows:
//! - the store-wide password gate (`LOCKED` / `UNLOCKED` per visitor session)
//! - the cart-return handler that reacts to visitors coming back from checkout
//!
//! # Architecture
//!
//! This crate does no HTTP and owns no storage. Collaborators (session store,
//! aside panel, navigator) are narrow traits implemented by the storefront
//! binary and by in-memory fakes in tests.
//!
//! # Modules
//!
//! - [`gate`] - Password gate state machine over a [`gate::GateSession`]
//! - [`cart_return`] - `cart_return=true` marker detection and URL scrubbing
//! - [`aside`] - Named slide-in panels (cart, mobile menu, search)
//! - [`banner`] - Auto-dismissing error banner with a cancellable timer
//! - [`countdown`] - Launch countdown shown on the lock screen

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aside;
pub mod banner;
pub mod cart_return;
pub mod countdown;
pub mod gate;

pub use aside::{AsideKind, AsideKindError, AsideState};
pub use banner::ErrorBanner;
pub use cart_return::{AsidePanel, CartReturn, Navigator};
pub use countdown::Countdown;
pub use gate::{GateOutcome, GateRejection, GateSession, GateState, PasswordGate};
