//! End-to-end rendering of a small multilingual site.
//!
//! Builds an input tree in a temp directory, runs the library entry point and
//! checks the pages that land in the output tree.

use rdfpub_render::config::RenderConfig;
use rdfpub_render::walk::{WalkError, render_tree};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BASE: &str = "https://example.org/site/";

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

const ORGS: &str = r#"{
  "head": { "vars": ["name", "page"] },
  "results": { "bindings": [
    { "name": { "type": "literal", "value": "W3C" },
      "page": { "type": "uri", "value": "https://example.org/site/orgs/w3c?tab=about#top" } },
    { "name": { "type": "literal", "value": "IETF" },
      "page": { "type": "uri", "value": "https://example.org/site/orgs/ietf" } }
  ] }
}"#;

const NONE: &str = r#"{ "head": { "vars": ["name"] }, "results": { "bindings": [] } }"#;

const TITLE_EN: &str = r#"{
  "head": { "vars": ["title", "about"] },
  "results": { "bindings": [
    { "title": { "type": "literal", "value": "Standards", "xml:lang": "en" },
      "about": { "type": "literal", "value": "A *short* list.", "xml:lang": "en" } }
  ] }
}"#;

const TITLE_FR: &str = r#"{
  "head": { "vars": ["title"] },
  "results": { "bindings": [
    { "title": { "type": "literal", "value": "Normes", "xml:lang": "fr" } }
  ] }
}"#;

fn build_site(input: &Path) {
    write(input, "title@en.rq", TITLE_EN);
    write(input, "title@fr.rq", TITLE_FR);
    write(input, "header.html", "<header>{{title.title}}</header>");
    write(
        input,
        "index@en.html",
        "{{> header}}{{{markdown title.about}}}<p>{{$language}}</p>",
    );
    write(input, "index@fr.md", "# {{title.title}}\n\nLangue : {{$language}}\n");

    write(input, "orgs/orgs@en.rq", ORGS);
    write(input, "orgs/nobody@en.rq", NONE);
    write(
        input,
        "orgs/index@en.html",
        concat!(
            "<ul>{{#each orgs}}<li><a href=\"{{{relative page}}}\">{{name}}</a></li>{{/each}}</ul>",
            "{{#if nobody}}has people{{else}}no people{{/if}}",
            "|{{orgs.name}}|{{#if (all orgs nobody)}}both{{/if}}{{#if (any orgs nobody)}}either{{/if}}",
            "|{{$resource}}",
        ),
    );
    write(input, "orgs/data.ttl", "<a> <b> <c> .");
    write(input, "orgs/notes.txt", "ignored");
}

fn config(tmp: &TempDir) -> RenderConfig {
    RenderConfig::new(tmp.path().join("in"), tmp.path().join("out"), BASE, "en").unwrap()
}

#[test]
fn renders_every_language_of_every_resource() {
    let tmp = TempDir::new().unwrap();
    build_site(&tmp.path().join("in"));

    let report = render_tree(&config(&tmp)).unwrap();
    let out = tmp.path().join("out");

    assert_eq!(report.pages_written(), 3);
    assert_eq!(report.files_skipped(), 2);
    assert!(out.join("index@en.html").is_file());
    assert!(out.join("index@fr.html").is_file());
    assert!(out.join("orgs/index@en.html").is_file());
    assert!(!out.join("orgs/index@fr.html").exists());
}

#[test]
fn html_index_uses_partials_and_markdown_helper() {
    let tmp = TempDir::new().unwrap();
    build_site(&tmp.path().join("in"));
    render_tree(&config(&tmp)).unwrap();

    let page = fs::read_to_string(tmp.path().join("out/index@en.html")).unwrap();
    assert_eq!(
        page,
        "<header>Standards</header><p>A <em>short</em> list.</p>\n<p>en</p>"
    );
}

#[test]
fn markdown_index_is_converted_after_templating() {
    let tmp = TempDir::new().unwrap();
    build_site(&tmp.path().join("in"));
    render_tree(&config(&tmp)).unwrap();

    let page = fs::read_to_string(tmp.path().join("out/index@fr.html")).unwrap();
    assert_eq!(page, "<h1>Normes</h1>\n<p>Langue : fr</p>\n");
}

#[test]
fn nested_resource_iterates_rows_and_resolves_links() {
    let tmp = TempDir::new().unwrap();
    build_site(&tmp.path().join("in"));
    render_tree(&config(&tmp)).unwrap();

    let page = fs::read_to_string(tmp.path().join("out/orgs/index@en.html")).unwrap();
    assert_eq!(
        page,
        concat!(
            "<ul><li><a href=\"/site/orgs/w3c?tab=about#top\">W3C</a></li>",
            "<li><a href=\"/site/orgs/ietf\">IETF</a></li></ul>",
            "no people",
            "|W3C|either",
            "|https://example.org/site/orgs",
        )
    );
}

#[test]
fn rerun_overwrites_previous_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    build_site(&input);
    render_tree(&config(&tmp)).unwrap();

    write(&input, "index@en.html", "changed");
    render_tree(&config(&tmp)).unwrap();

    let page = fs::read_to_string(tmp.path().join("out/index@en.html")).unwrap();
    assert_eq!(page, "changed");
}

#[test]
fn template_errors_abort_the_run() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    build_site(&input);
    write(&input, "orgs/index@en.html", "{{#each orgs}}never closed");

    assert!(matches!(
        render_tree(&config(&tmp)),
        Err(WalkError::Resource(_))
    ));
}
