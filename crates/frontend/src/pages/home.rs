use yew::prelude::*;

use crate::auth::Account;
use crate::components::auth_buttons::{LoginButton, LogoutButton};
use crate::services::api::ApiService;

#[function_component(Home)]
pub fn home() -> Html {
    let accounts = use_context::<Vec<Account>>().unwrap_or_default();
    let loading = use_state(|| false);
    let result = use_state(|| None::<Result<String, String>>);

    let on_call = {
        let loading = loading.clone();
        let result = result.clone();
        Callback::from(move |_: MouseEvent| {
            let loading = loading.clone();
            let result = result.clone();
            loading.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let response = ApiService::ping().await;
                if let Err(e) = &response {
                    tracing::error!("Ping failed: {}", e);
                }
                result.set(Some(response));
                loading.set(false);
            });
        })
    };

    let outcome = match &*result {
        Some(Ok(data)) => html! {
            <div><p>{ format!("API result: {:?}", data) }</p></div>
        },
        Some(Err(error)) => html! {
            <div><p>{ format!("API error: {:?}", error) }</p></div>
        },
        None => html! {},
    };

    html! {
        <div class="container">
            <div style="height: 70vh; text-align: center;">
                <h1>{ "Home page" }</h1>
                <div style="padding: 20px;">
                    if let Some(account) = accounts.first() {
                        <>
                            <h1>{ format!("Welcome, {}", account.username) }</h1>
                            <div>
                                <button onclick={on_call} disabled={*loading}>
                                    { if *loading { "Calling API..." } else { "Call API by token" } }
                                </button>
                            </div>
                            { outcome }
                            <LogoutButton />
                        </>
                    } else {
                        <LoginButton />
                    }
                </div>
            </div>
        </div>
    }
}
