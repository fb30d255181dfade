use yew::prelude::*;

use crate::auth::session;

#[function_component(LoginButton)]
pub fn login_button() -> Html {
    let onclick = Callback::from(|_: MouseEvent| {
        if let Err(e) = session::sign_in_redirect() {
            tracing::error!("Failed to start sign-in: {}", e);
        }
    });

    html! {
        <button class="btn btn-primary" {onclick}>{ "Login with Azure AD" }</button>
    }
}

#[function_component(LogoutButton)]
pub fn logout_button() -> Html {
    let onclick = Callback::from(|_: MouseEvent| session::sign_out_redirect());

    html! {
        <button class="btn" {onclick}>{ "Logout" }</button>
    }
}
