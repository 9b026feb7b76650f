use proptest::prelude::*;

use livepen::sanitize;
use livepen::sanitize::is_local_reference;

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(r#"<link rel="stylesheet" href="style.css">"#.to_string()),
        Just(r#"<link rel="stylesheet" href="https://cdn.example.com/a.css">"#.to_string()),
        Just(r#"<script src="app.js"></script>"#.to_string()),
        Just("<script>let a = 1 < 2;</script>".to_string()),
        Just(r#"<img src="cat.png" alt="cat">"#.to_string()),
        Just(r#"<img src="data:image/png;base64,AAAA">"#.to_string()),
        Just("<p>text</p>".to_string()),
        Just("<!-- note -->".to_string()),
        "[a-zA-Z0-9 .,<>/=\"'-]{0,24}",
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(markup in document()) {
        let once = sanitize(&markup);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn markup_without_resources_is_untouched(text in "[a-zA-Z0-9 .,!?]{0,64}") {
        let markup = format!("<main><p>{text}</p></main>");
        prop_assert_eq!(sanitize(&markup), markup);
    }

    #[test]
    fn no_local_stylesheet_survives(name in "[a-z]{1,8}", markup in document()) {
        let link = format!(r#"<link rel="stylesheet" href="{name}.css">"#);
        let out = sanitize(&format!("{link}{markup}"));
        prop_assert!(!out.contains(&link));
    }

    #[test]
    fn remote_urls_are_never_local(host in "[a-z]{1,12}", path in "[a-z/]{0,12}") {
        let https = format!("https://{host}.com/{path}");
        let http = format!("HTTP://{host}.com/{path}");
        prop_assert!(!is_local_reference(&https));
        prop_assert!(!is_local_reference(&http));
    }

    #[test]
    fn sanitize_never_panics(markup in "\\PC{0,80}") {
        let _ = sanitize(&markup);
    }
}
