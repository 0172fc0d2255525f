mod bootstrap;
mod demo_route;

pub(crate) use bootstrap::build_app;
