mod auth;
mod components;
mod config;
mod pages;
mod router;
mod services;

use domain_policy::{AdvisoryCheck, AdvisoryOutcome};
use yew::prelude::*;
use yew_router::BrowserRouter;

use crate::auth::{session, Account};
use crate::router::{switch, Route};

const DOMAIN_NOT_ALLOWED: &str = "You are not allowed to login with this domain";

#[function_component(App)]
fn app() -> Html {
    let accounts = use_state(session::all_accounts);
    let check = use_memo((), |_| AdvisoryCheck::new(config::ALLOWED_DOMAIN));

    // Another tab signing in or out changes the cached account list.
    {
        let accounts = accounts.clone();
        use_effect_with((), move |_| {
            let listener =
                gloo::events::EventListener::new(&gloo::utils::window(), "storage", move |_| {
                    accounts.set(session::all_accounts());
                });
            move || drop(listener)
        });
    }

    // Advisory only: the backend enforces the domain on every request.
    {
        let check = check.clone();
        use_effect_with((*accounts).clone(), move |accounts| {
            let evaluation = check.observe(accounts.as_slice());
            if let AdvisoryOutcome::SignOut { username } = &evaluation.outcome {
                tracing::warn!(%username, "Signed-in account is outside the allowed domain");
                let check = check.clone();
                let evaluation = evaluation.clone();
                // Decide on the next tick so a newer account list can supersede this one.
                wasm_bindgen_futures::spawn_local(async move {
                    if !check.is_current(&evaluation) {
                        return;
                    }
                    gloo::dialogs::alert(DOMAIN_NOT_ALLOWED);
                    if check.is_current(&evaluation) {
                        session::sign_out_redirect();
                    }
                });
            }
            || ()
        });
    }

    html! {
        <ContextProvider<Vec<Account>> context={(*accounts).clone()}>
            <BrowserRouter>
                <div id="app">
                    <yew_router::Switch<Route> render={switch} />
                </div>
            </BrowserRouter>
        </ContextProvider<Vec<Account>>>
    }
}

fn main() {
    tracing_wasm::set_as_global_default();

    // Finish a pending sign-in before the first render sees the account list.
    wasm_bindgen_futures::spawn_local(async {
        match session::handle_redirect().await {
            Ok(Some(account)) => tracing::debug!(username = %account.username, "Redirect handled"),
            Ok(None) => {}
            Err(e) => tracing::error!("Sign-in redirect error: {}", e),
        }

        yew::Renderer::<App>::new().render();
    });
}
