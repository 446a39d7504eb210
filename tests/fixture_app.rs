// Fixture replica of the marketing site, shared between the integration
// tests and the standalone fixture-server binary.
//
// The real site is a moving target; this app reproduces the behaviors the
// suite verifies — consent banner, locale dropdown, account dropdown,
// shop/registration links opening new tabs, back-to-top — with
// deterministic markup. It also wraps `IntersectionObserver` with a live
// counter so tests can assert the viewport probe never leaks observers.

use axum::{Router, response::Html, routing::get};
use tower_http::cors::CorsLayer;

pub async fn create_app() -> Router {
    Router::new()
        .route("/", get(home_default))
        .route("/en/", get(home_en))
        .route("/de/", get(home_de))
        .route("/shop", get(shop_page))
        .route("/signup", get(signup_page))
        .route("/probe", get(probe_page))
        .layer(CorsLayer::permissive())
}

// Shared page script: observer accounting, dropdown toggles, consent
// banner wiring, back-to-top.
const SITE_SCRIPT: &str = r#"
(function () {
    // Wrap IntersectionObserver so tests can count live observers
    var Native = window.IntersectionObserver;
    window.__activeObservers = 0;
    window.IntersectionObserver = function (callback, options) {
        var inner = new Native(callback, options);
        var live = false;
        return {
            observe: function (el) {
                if (!live) { live = true; window.__activeObservers += 1; }
                inner.observe(el);
            },
            unobserve: function (el) { inner.unobserve(el); },
            disconnect: function () {
                if (live) { live = false; window.__activeObservers -= 1; }
                inner.disconnect();
            },
            takeRecords: function () { return inner.takeRecords(); }
        };
    };

    function toggle(id) {
        var menu = document.getElementById(id);
        if (!menu) return;
        if (menu.hasAttribute('hidden')) {
            menu.removeAttribute('hidden');
        } else {
            menu.setAttribute('hidden', '');
        }
    }

    var localeToggle = document.getElementById('locale-toggle');
    if (localeToggle) {
        localeToggle.addEventListener('click', function (event) {
            event.preventDefault();
            toggle('locale-menu');
        });
        document.querySelectorAll('#locale-menu button').forEach(function (button) {
            button.addEventListener('click', function () {
                window.location.href = '/' + button.getAttribute('data-locale') + '/';
            });
        });
    }

    var accountToggle = document.getElementById('account-toggle');
    if (accountToggle) {
        accountToggle.addEventListener('click', function (event) {
            event.preventDefault();
            toggle('account-menu');
        });
    }

    var banner = document.getElementById('consent-banner');
    if (banner) {
        var closeBanner = function () {
            banner.parentNode.removeChild(banner);
        };
        banner.querySelector('[data-testid="uc-accept-all-button"]')
            .addEventListener('click', function () {
                document.cookie = 'uc_consent=all; path=/';
                var script = document.createElement('script');
                script.src = 'https://www.google-analytics.com/analytics.js';
                document.head.appendChild(script);
                closeBanner();
            });
        banner.querySelector('[data-testid="uc-save-button"]')
            .addEventListener('click', closeBanner);
        banner.querySelector('[data-testid="uc-deny-all-button"]')
            .addEventListener('click', closeBanner);
    }

    var backToTop = document.querySelector('.back-to-top');
    if (backToTop) {
        backToTop.addEventListener('click', function () {
            window.scrollTo(0, 0);
        });
    }
})();
"#;

fn home_page(lang: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="utf-8">
    <title>Home | tapio</title>
    <style>
        body {{ margin: 0; min-height: 3000px; font-family: sans-serif; }}
        .header {{ position: absolute; top: 0; left: 0; right: 0; height: 64px; background: #ffffff; border-bottom: 1px solid #ddd; }}
        nav {{ display: flex; gap: 16px; padding: 16px; }}
        .dropdown-menu {{ position: absolute; top: 48px; background: #ffffff; border: 1px solid #ddd; padding: 8px; }}
        main {{ padding-top: 96px; }}
        footer {{ margin-top: 2400px; padding: 24px; background: #f4f4f4; }}
        .back-to-top {{ position: fixed; bottom: 16px; right: 16px; }}
        #consent-banner {{ position: fixed; bottom: 0; left: 0; right: 0; background: #eeeeee; padding: 12px; }}
    </style>
</head>
<body>
    <header class="header">
        <nav>
            <a class="nav-link" href="#" id="locale-toggle">language</a>
            <div class="dropdown-menu" id="locale-menu" hidden>
                <button type="button" data-locale="de">DE</button>
                <button type="button" data-locale="en">EN</button>
            </div>
            <a class="nav-link" href="#" id="account-toggle">My tapio</a>
            <div class="dropdown-menu" id="account-menu" hidden>
                <a class="dropdown-item" href="/signup?register=customer" target="_blank">Register</a>
            </div>
            <a class="nav-item" href="/shop">Shop</a>
        </nav>
    </header>
    <main>
        <h1>Smart manufacturing for the wood industry</h1>
        <p class="teaser">Discover digital services in the
            <a class="teaser-link" href="/shop" target="_blank">Shop</a>.
        </p>
    </main>
    <footer>
        <a class="call-to-action" href="/signup?register=customer" target="_blank">Register</a>
        <p>&#169; tapio</p>
    </footer>
    <button type="button" class="back-to-top">to Top</button>
    <div id="consent-banner">
        <p>We use cookies to improve our services.</p>
        <button type="button" data-testid="uc-accept-all-button">Accept all</button>
        <button type="button" data-testid="uc-save-button">Save services</button>
        <button type="button" data-testid="uc-deny-all-button">Deny</button>
    </div>
    <script>{script}</script>
</body>
</html>
"##,
        lang = lang,
        script = SITE_SCRIPT,
    )
}

async fn home_default() -> Html<String> {
    Html(home_page("en"))
}

async fn home_en() -> Html<String> {
    Html(home_page("en"))
}

async fn home_de() -> Html<String> {
    Html(home_page("de"))
}

async fn shop_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Marketplace | tapio</title></head>
<body>
    <h1>Marketplace</h1>
    <p>Browse digital services for your machines.</p>
</body>
</html>
"#,
    )
}

async fn signup_page() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Sign up | my tapio</title></head>
<body>
    <h1>Create your account</h1>
    <form>
        <input name="email" type="email" placeholder="E-mail">
        <button type="submit">Continue</button>
    </form>
</body>
</html>
"#,
    )
}

// Playground for the viewport probe: a top-anchored banner, a hidden
// element, a zero-area element, and one far below the fold.
async fn probe_page() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Probe playground</title>
    <style>
        body {{ margin: 0; height: 4000px; }}
        #top-banner {{ position: absolute; top: 0; left: 0; right: 0; height: 60px; background: #dddddd; }}
        #hidden-note {{ display: none; }}
        #zero-size {{ position: absolute; top: 10px; left: 10px; width: 0; height: 0; padding: 0; border: 0; overflow: hidden; }}
        #below-fold {{ position: absolute; top: 3000px; left: 0; }}
    </style>
</head>
<body>
    <header id="top-banner">Probe playground</header>
    <div id="hidden-note">not rendered</div>
    <div id="zero-size"></div>
    <div id="below-fold">far below the fold</div>
    <script>{script}</script>
</body>
</html>
"#,
        script = SITE_SCRIPT,
    ))
}
