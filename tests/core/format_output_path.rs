//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use mhtml2html::core::format_output_path;

    #[test]
    fn as_is() {
        let final_destination = format_output_path("/home/user/Downloads/page.html", None);
        assert_eq!(final_destination, "/home/user/Downloads/page.html");
    }

    #[test]
    fn substitute_title() {
        let final_destination =
            format_output_path("/home/user/Downloads/%title%.html", Some("Document Title"));
        assert_eq!(final_destination, "/home/user/Downloads/Document Title.html");
    }

    #[test]
    fn substitute_title_multi() {
        let final_destination = format_output_path(
            "/home/user/Downloads/%title%/%title%/%title%.html",
            Some("Document Title"),
        );
        assert_eq!(
            final_destination,
            "/home/user/Downloads/Document Title/Document Title/Document Title.html"
        );
    }

    #[test]
    fn sanitize() {
        let final_destination = format_output_path(
            r#"/home/user/Downloads/%title%.html"#,
            Some(r#"Sanitize/\<>:"|?/ Me!"#),
        );
        assert_eq!(
            final_destination,
            "/home/user/Downloads/Sanitize__[] - -_ Me!.html"
        );
    }

    #[test]
    fn level_up() {
        let final_destination = format_output_path("../%title%.html", Some(".Title"));
        assert_eq!(final_destination, "../Title.html");
    }

    #[test]
    fn missing_title() {
        let final_destination = format_output_path("/tmp/%title%.html", None);
        assert_eq!(final_destination, "/tmp/.html");
    }

    #[test]
    fn file_extension() {
        let final_destination = format_output_path("/home/user/Downloads/page.%extension%", None);
        assert_eq!(final_destination, "/home/user/Downloads/page.html");
    }

    #[test]
    fn file_extension_short() {
        let final_destination = format_output_path("/home/user/Downloads/page.%ext%", None);
        assert_eq!(final_destination, "/home/user/Downloads/page.htm");
    }

    #[test]
    fn timestamp() {
        let final_destination = format_output_path("/tmp/%timestamp%.html", None);
        assert!(final_destination.starts_with("/tmp/"));
        assert!(final_destination.ends_with("Z.html"));
        assert!(!final_destination.contains(':'));
    }
}
