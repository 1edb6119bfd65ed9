use folio::Site;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_site() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "_config.yml",
        "output_dir: public\nfilters:\n  tag_url_prefix: /topics/\n",
    );
    write(
        root,
        "_includes/base.liquid",
        "<html><title>{{ title }}</title><body>{{ content }}<footer>{{ year() }}</footer></body></html>",
    );
    write(
        root,
        "_includes/post.liquid",
        "---\nlayout: base\n---\n<article>{{ content }}<p>{{ tags | tag_list }}</p></article>",
    );
    write(
        root,
        "posts/first.md",
        "---\ntitle: First\ndate: 2024-03-05\ntags: [rust, web]\nlayout: post\n---\n# Intro\n\nHello *world*.\n\nSecond paragraph.\n",
    );
    write(
        root,
        "posts/second.md",
        "---\ntitle: Second\ndate: 2023-01-01\ntags: cli\nlayout: post\n---\nBody of second.\n",
    );
    write(
        root,
        "projects/tool.md",
        "---\ntitle: Tool\ntags: [rust]\n---\nA small tool.\n",
    );
    write(
        root,
        "index.liquid",
        concat!(
            "---\ntitle: Home\nlayout: base\n---\n",
            "<ul>{% for post in collections.posts %}",
            "<li><a href=\"{{ post.url }}\">{{ post.data.title }}</a> {{ post.data.date | date_to_string }}: {{ post.content | excerpt }}</li>",
            "{% endfor %}</ul>",
            "<ol>{% for project in collections.projects %}<li>{{ project.data.title }}</li>{% endfor %}</ol>",
            "<nav>{{ collections.tags | tag_list }}</nav>",
        ),
    );
    write(root, "assets/css/site.css", "body { margin: 0 }\n");

    dir
}

#[test]
fn test_build_full_site() {
    let dir = sample_site();
    let site = Site::new(dir.path()).unwrap();

    let summary = site.build().unwrap();
    assert_eq!(summary.records, 4);
    assert_eq!(summary.written, 4);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.copied, 1);

    let out = dir.path().join("public");

    let post = fs::read_to_string(out.join("posts/first/index.html")).unwrap();
    assert!(post.starts_with("<html><title>First</title><body><article>"));
    assert!(post.contains(
        r##"<h1 id="intro" tabindex="-1"><a class="header-anchor" href="#intro">Intro</a></h1>"##
    ));
    assert!(post.contains("<p>Hello <em>world</em>.</p>"));
    assert!(post.contains(
        r#"<p><a href="/topics/rust/" >rust</a> and <a href="/topics/web/" >web</a></p>"#
    ));

    let footer = post
        .split("<footer>")
        .nth(1)
        .and_then(|rest| rest.split("</footer>").next())
        .unwrap();
    assert_eq!(footer.len(), 4);
    assert!(footer.chars().all(|c| c.is_ascii_digit()));

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains(concat!(
        r#"<ul><li><a href="/posts/second/">Second</a> 1 Jan 2023: Body of second....</li>"#,
        r#"<li><a href="/posts/first/">First</a> 5 Mar 2024: Hello <em>world</em>....</li></ul>"#,
    )));
    assert!(index.contains("<ol><li>Tool</li></ol>"));
    assert!(index.contains(concat!(
        r#"<nav><a href="/topics/cli/" >cli</a>, "#,
        r#"<a href="/topics/rust/" >rust</a>, and <a href="/topics/web/" >web</a></nav>"#,
    )));

    assert!(out.join("projects/tool/index.html").exists());
    assert_eq!(
        fs::read(out.join("assets/css/site.css")).unwrap(),
        b"body { margin: 0 }\n"
    );
    assert!(!out.join("_includes").exists());
}

#[test]
fn test_list_collections() {
    let dir = sample_site();
    let site = Site::new(dir.path()).unwrap();

    let posts = folio::commands::list::describe(&site, "posts").unwrap();
    assert_eq!(
        posts,
        vec![
            "2023-01-01 - Second [posts/second.md]",
            "2024-03-05 - First [posts/first.md]",
        ]
    );

    let projects = folio::commands::list::describe(&site, "projects").unwrap();
    assert_eq!(projects, vec!["---------- - Tool [projects/tool.md]"]);

    let tags = folio::commands::list::describe(&site, "tags").unwrap();
    assert_eq!(tags, vec!["cli", "rust", "web"]);
}

#[test]
fn test_clean_removes_output() {
    let dir = sample_site();
    let site = Site::new(dir.path()).unwrap();

    site.build().unwrap();
    assert!(dir.path().join("public").exists());

    site.clean().unwrap();
    assert!(!dir.path().join("public").exists());
    assert!(dir.path().join("posts/first.md").exists());
}

#[test]
fn test_dynamic_partials_config_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "_config.yml", "template:\n  dynamic_partials: true\n");
    assert!(Site::new(dir.path()).is_err());
}
