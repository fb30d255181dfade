use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::layout::MainLayout;
use crate::pages::{home::Home, not_found::NotFound};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

pub fn switch(routes: Route) -> Html {
    let page = match routes {
        Route::Home => html! { <Home /> },
        Route::NotFound => html! { <NotFound /> },
    };

    html! { <MainLayout>{ page }</MainLayout> }
}
