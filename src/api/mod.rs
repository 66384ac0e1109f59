use axum::Router;

pub mod equipment;
pub mod events;
pub mod rsvp;
pub mod venues;

pub fn app() -> Router {
    Router::new()
        .nest("/events", events::app())
        .nest("/venues", venues::app())
        .nest("/equipment", equipment::app())
        .nest("/rsvp", rsvp::app())
}
