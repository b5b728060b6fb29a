//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use mhtml2html::core::{convert_archive, ConvertOptions, ConvertOutcome, Converter};

    use crate::common::{attribute_value, data_url_payload, styled_page, MhtmlBuilder, PNG_PIXEL};

    fn entry_html(input: &[u8], options: ConvertOptions) -> String {
        let store = convert_archive(input, options).unwrap();
        String::from_utf8(store.entry().unwrap().data.clone()).unwrap()
    }

    #[test]
    fn inlines_stylesheet_and_its_background() {
        let html = entry_html(&styled_page().build(), ConvertOptions::default());

        assert!(!html.contains("style.css"));
        let stylesheet = attribute_value(&html, "href", "data:text/css;base64,").unwrap();
        let css = String::from_utf8(data_url_payload(stylesheet)).unwrap();

        assert!(!css.contains("bg.png"));
        let (_, image) = css.split_once("url(").unwrap();
        let image = &image[..image.find(')').unwrap()];
        assert!(image.starts_with("data:image/png;base64,"));
        assert_eq!(data_url_payload(image), PNG_PIXEL);
    }

    #[test]
    fn missing_resource_points_at_gateway_path() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<html><head><script src="https://cdn.example/lib.js"></script></head><body></body></html>"#,
            )
            .build();

        let html = entry_html(&input, ConvertOptions::default());
        assert!(html.contains(r#"<script src="/https%3A%2F%2Fcdn.example%2Flib.js"></script>"#));
    }

    #[test]
    fn relative_missing_resource_resolves_against_location() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/articles/post.html",
                "text/html",
                br#"<img src="../img/photo.jpg">"#,
            )
            .build();

        let html = entry_html(&input, ConvertOptions::default());
        assert!(html.contains(r#"src="/http%3A%2F%2Fexample.com%2Fimg%2Fphoto.jpg""#));
    }

    #[test]
    fn content_id_inlined_but_hyperlink_untouched() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<img src="cid:img1"><a href="cid:img1">full size</a>"#,
            )
            .base64_part("http://example.com/photo.png", "image/png", PNG_PIXEL)
            .content_id("img1")
            .build();

        let html = entry_html(&input, ConvertOptions::default());

        let image = attribute_value(&html, "src", "data:image/png;base64,").unwrap();
        assert_eq!(data_url_payload(image), PNG_PIXEL);
        assert!(html.contains(r#"<a href="cid:img1">full size</a>"#));
    }

    #[test]
    fn inline_styles_are_rewritten() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<style>p { background: url('bg.png') }</style><div style="background: url(cid:bg)"></div>"#,
            )
            .base64_part("bg.png", "image/png", PNG_PIXEL)
            .content_id("bg")
            .build();

        let html = entry_html(&input, ConvertOptions::default());
        assert!(!html.contains("bg.png"));
        assert!(!html.contains("cid:bg"));
        assert_eq!(html.matches("url(data:image/png;base64,").count(), 2);
    }

    #[test]
    fn shift_jis_document_is_converted() {
        let mut page: Vec<u8> = Vec::new();
        page.extend_from_slice(br#"<html><head><meta charset="shift_jis"><title>"#);
        page.extend_from_slice(b"\x93\xfa\x96\x7b");
        page.extend_from_slice(b"</title></head><body><p>\x93\xfa\x96\x7b</p></body></html>");

        let input = MhtmlBuilder::new()
            .base64_part("http://example.jp/", "text/html; charset=Shift_JIS", &page)
            .build();

        let store = convert_archive(&input, ConvertOptions::default()).unwrap();
        let entry = store.entry().unwrap();
        let html = String::from_utf8(entry.data.clone()).unwrap();

        assert!(entry.is_converted);
        assert_eq!(entry.content_type, "text/html");
        assert!(html.contains(r#"<meta charset="utf-8">"#));
        assert!(html.contains("<p>日本</p>"));

        let outcome = ConvertOutcome::from_store(&store).unwrap();
        assert_eq!(outcome.entry_title.as_deref(), Some("日本"));
    }

    #[test]
    fn meta_utf16_declaration_is_read_as_utf8() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/",
                "text/html",
                br#"<html><head><meta charset="utf-16"></head><body><p>plain</p></body></html>"#,
            )
            .build();

        let store = convert_archive(&input, ConvertOptions::default()).unwrap();
        let entry = store.entry().unwrap();
        let html = String::from_utf8(entry.data.clone()).unwrap();

        assert!(!entry.is_converted);
        assert_eq!(
            html,
            r#"<html><head><meta charset="utf-16"></head><body><p>plain</p></body></html>"#
        );
    }

    #[test]
    fn structural_selectors_in_removal_rules() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/",
                "text/html",
                br#"<ul><li>one</li><li>two</li><li>three</li></ul><div><img src="x.png"></div><p></p><p>kept</p><section title="t"></section><section title="u"></section>"#,
            )
            .build();

        let options = ConvertOptions {
            remove_elements: vec![
                "li:nth-child(2)".to_string(),
                "div:has(> img)".to_string(),
                "p:empty".to_string(),
            ],
            remove_attributes: vec![("section:first-of-type".to_string(), "title".to_string())],
            ..Default::default()
        };
        let html = entry_html(&input, options);

        assert!(html.contains("<ul><li>one</li><li>three</li></ul>"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<p></p>"));
        assert!(html.contains("<p>kept</p>"));
        assert!(html.contains(r#"<section title=""></section><section title="u"></section>"#));
    }

    #[test]
    fn removal_rules_apply_to_every_document() {
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<div class="ad">buy</div><p id="keep" onclick="x()">text</p>"#,
            )
            .part(
                "http://example.com/frame.html",
                "text/html",
                br#"<div class="ad">more</div>"#,
            )
            .build();

        let options = ConvertOptions {
            remove_elements: vec![".ad".to_string()],
            remove_attributes: vec![("#keep".to_string(), "onclick".to_string())],
            ..Default::default()
        };
        let store = convert_archive(&input, options).unwrap();

        for resource in store.html_resources() {
            let html = String::from_utf8(resource.data.clone()).unwrap();
            assert!(!html.contains("class=\"ad\""), "{}", resource.location);
        }

        let entry = String::from_utf8(store.entry().unwrap().data.clone()).unwrap();
        assert!(entry.contains(r#"<p id="keep" onclick="">text</p>"#));
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let input = styled_page()
            .part(
                "http://example.com/frame.html",
                "text/html",
                br#"<img src="bg.png"><script src="/app.js"></script>"#,
            )
            .build();

        let sequential = convert_archive(
            &input,
            ConvertOptions {
                parallel: false,
                ..Default::default()
            },
        )
        .unwrap();
        let parallel = convert_archive(
            &input,
            ConvertOptions {
                parallel: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for resource in sequential.iter() {
            assert_eq!(
                parallel.get(&resource.location).unwrap().data,
                resource.data,
                "{}",
                resource.location
            );
        }
    }

    #[test]
    fn outcome_concatenates_documents_in_store_order() {
        let input = MhtmlBuilder::new()
            .part("http://example.com/b.html", "text/html", b"<title>B</title>")
            .part("http://example.com/a.html", "text/html", b"<title>A</title>")
            .build();

        let store = Converter::new(ConvertOptions::default()).convert(&input).unwrap();
        let outcome = ConvertOutcome::from_store(&store).unwrap();
        let output = String::from_utf8(outcome.output).unwrap();

        assert_eq!(outcome.entry_location, "http://example.com/b.html");
        assert_eq!(outcome.entry_title.as_deref(), Some("B"));
        assert!(output.find("<title>A</title>").unwrap() < output.find("<title>B</title>").unwrap());
    }

    #[cfg(feature = "minify")]
    #[test]
    fn minified_stylesheet_is_inlined() {
        use base64::{prelude::BASE64_STANDARD, Engine};

        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<link rel="stylesheet" href="site.css">"#,
            )
            .base64_part("site.css", "text/css", b"body {\n    color: red;\n}\n")
            .build();

        let options = ConvertOptions {
            minify: true,
            ..Default::default()
        };
        let html = entry_html(&input, options);
        let expected = format!("data:text/css;base64,{}", BASE64_STANDARD.encode("body{color:red}"));
        assert!(html.contains(&expected));
    }

    #[cfg(feature = "minify")]
    #[test]
    fn minified_script_is_inlined() {
        let source: &[u8] = b"// say hello\nfunction greet(name) {\n    return 'hi ' + name;\n}\n";
        let input = MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<script src="app.js"></script>"#,
            )
            .part("app.js", "text/javascript", source)
            .part("data.json", "application/json", b"{ \"a\": 1 }")
            .build();

        let options = ConvertOptions {
            minify: true,
            ..Default::default()
        };
        let store = convert_archive(&input, options).unwrap();
        let html = String::from_utf8(store.entry().unwrap().data.clone()).unwrap();

        let data_url = attribute_value(&html, "src", "data:text/javascript;base64,").unwrap();
        let script = String::from_utf8(data_url_payload(data_url)).unwrap();
        assert!(script.len() < source.len());
        assert!(script.contains("function greet("));
        assert!(!script.contains("say hello"));

        assert_eq!(store.get("data.json").unwrap().data, b"{ \"a\": 1 }");
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use mhtml2html::core::{convert_archive, ConvertOptions, MhtmlError};

    use crate::common::styled_page;

    #[test]
    fn invalid_selector_fails_before_decoding() {
        let options = ConvertOptions {
            remove_elements: vec!["div >".to_string()],
            ..Default::default()
        };

        assert!(matches!(
            convert_archive(b"not an archive", options),
            Err(MhtmlError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn invalid_attribute_selector() {
        let options = ConvertOptions {
            remove_attributes: vec![("img:hover".to_string(), "src".to_string())],
            ..Default::default()
        };

        let result = convert_archive(&styled_page().build(), options);
        match result {
            Err(MhtmlError::InvalidSelector { selector, .. }) => assert_eq!(selector, "img:hover"),
            other => panic!("unexpected result: {:?}", other.map(|store| store.len())),
        }
    }

    #[test]
    fn invalid_base_href() {
        let input = crate::common::MhtmlBuilder::new()
            .part(
                "http://example.com/index.html",
                "text/html",
                br#"<html><head><base href="http://example.com:99999/"></head></html>"#,
            )
            .build();

        assert!(matches!(
            convert_archive(&input, ConvertOptions::default()),
            Err(MhtmlError::ReferenceResolution { .. })
        ));
    }
}
