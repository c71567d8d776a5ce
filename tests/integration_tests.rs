//! Integration tests for msdetect
//!
//! These tests verify:
//! - Taxonomy loading from word-list files
//! - Descriptor analysis through graph metrics and serialization
//! - Full working-copy analysis into a persisted record
//! - Resumption through the result store and repository lists

use msdetect::analyzer::RepositoryAnalyzer;
use msdetect::compose::ServiceGraphBuilder;
use msdetect::domain::{RepoRef, RepositoryFacts};
use msdetect::input::{read_repo_list, InputOptions};
use msdetect::store::ResultStore;
use msdetect::taxonomy::{CategoryKind, Taxonomy};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write_taxonomy(dir: &Path) {
    let files = [
        ("db.csv", "MySQL\npostgres\n\n"),
        ("db-2.csv", "mongodb\nmysql\nredis\n"),
        ("bus.csv", "rabbitmq\nkafka\n"),
        ("lang.csv", "java\njavascript\npython\n"),
        ("server.csv", "tomcat\nnode\n"),
        ("gateway.csv", "zuul\nnginx\n"),
        ("monitor.csv", "prometheus\ngrafana\n"),
        ("discovery.csv", "eureka\n"),
    ];
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn load_taxonomy() -> Arc<Taxonomy> {
    let dir = create_test_dir();
    write_taxonomy(dir.path());
    Arc::new(Taxonomy::load(dir.path()).unwrap())
}

mod taxonomy_loading {
    use super::*;

    #[test]
    fn test_database_lists_merged() {
        let taxonomy = load_taxonomy();
        let dbs = taxonomy.category(CategoryKind::Dbs);
        assert_eq!(dbs.words().len(), 4);
        assert!(dbs.matches("mysql"));
        assert!(dbs.matches("REDIS"));
    }

    #[test]
    fn test_missing_file_reported() {
        let dir = create_test_dir();
        write_taxonomy(dir.path());
        fs::remove_file(dir.path().join("discovery.csv")).unwrap();

        let err = Taxonomy::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("discovery.csv"));
    }
}

mod descriptor_analysis {
    use super::*;

    #[test]
    fn test_cyclic_descriptor_serializes_null_longest_path() {
        let builder = ServiceGraphBuilder::new(load_taxonomy());
        let analysis = builder.analyze(
            "/docker-compose.yml",
            br#"
services:
  a:
    build: ./a
    depends_on: [b]
  b:
    build: ./b
    depends_on: [a]
"#,
        );

        assert!(!analysis.dep_graph_full.acyclic);
        assert_eq!(analysis.dep_graph_full.longest_path, None);

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["dep_graph_full"]["longest_path"].is_null());
        assert_eq!(json["dep_graph_full"]["edges"], 2);
    }

    #[test]
    fn test_reduced_graph_is_subgraph() {
        let builder = ServiceGraphBuilder::new(load_taxonomy());
        let analysis = builder.analyze(
            "/docker-compose.yml",
            br#"
services:
  gateway:
    image: nginx:latest
    depends_on: [orders, users]
  orders:
    build: ./orders
    depends_on: [users, cache]
  users:
    build: ./users
  cache:
    image: redis
"#,
        );

        let full = analysis.full_graph();
        let micro = analysis.micro_graph();
        assert_eq!(full.node_count(), 4);
        assert_eq!(micro.node_count(), 2);
        for name in micro.node_names() {
            assert!(full.contains(name));
        }
        assert!(micro.has_edge("orders", "users"));
        assert_eq!(micro.edge_count(), 1);
        assert_eq!(analysis.dep_graph_micro.longest_path, Some(1));
        assert_eq!(analysis.dep_graph_full.longest_path, Some(2));
    }
}

mod repository_analysis {
    use super::*;

    #[test]
    fn test_record_round_trips_through_store() {
        let workdir = create_test_dir();
        let root = workdir.path();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(
            root.join("docker-compose.yml"),
            "services:\n  web:\n    build: ./web\n    links: ['db:database']\n  db:\n    image: mysql:8\n",
        )
        .unwrap();
        fs::write(root.join("web/Dockerfile"), "FROM python:3.11\nRUN pip install flask\nCMD python app.py\n").unwrap();
        fs::write(root.join("web/requirements.txt"), "flask==2.0\nredis==4.0\n").unwrap();

        let analyzer = RepositoryAnalyzer::new(load_taxonomy());
        let repo = RepoRef::from_url("https://github.com/acme/blog");
        let facts = RepositoryFacts {
            url: repo.url.clone(),
            name: repo.name.clone(),
            committers: 3,
            size: 7,
            languages: vec!["python".to_string()],
        };
        let record = analyzer.analyze(root, facts).unwrap();
        assert_eq!(record.structure.services[0].depends_on, vec!["db"]);
        assert_eq!(record.structure.detected_dbs.services, vec!["db"]);
        assert!(record.tags.dbs.contains("mysql"));
        assert!(record.tags.dbs.contains("redis"));
        assert_eq!(record.images, vec!["python"]);

        let results = create_test_dir();
        let store = ResultStore::new(results.path());
        let path = store.persist(&repo, &record).unwrap();
        assert_eq!(path.file_name().unwrap(), "acme#blog.json");

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        for key in [
            "url",
            "name",
            "committers",
            "size",
            "languages",
            "dockers",
            "structure",
            "files",
            "dbs",
            "num_dbs",
            "shared_dbs",
            "images",
            "num_services",
            "num_dockers",
            "num_files",
            "avg_size_service",
        ] {
            assert!(json.get(key).is_some(), "missing field {}", key);
        }
        assert_eq!(json["num_dbs"], 2);
        assert_eq!(json["dockers"][0]["from_full"], "python:3.11");
    }
}

mod resumption {
    use super::*;

    #[test]
    fn test_fix_errors_excludes_completed_identifiers() {
        let results = create_test_dir();
        fs::write(results.path().join("CS340-19#lectures.json"), "{}").unwrap();
        let store = ResultStore::new(results.path());

        let lists = create_test_dir();
        let list_path = lists.path().join("P.U.csv");
        fs::write(&list_path, "ProjectID,Stars\nCS340-19_lectures,3\nacme_shop,10\n").unwrap();

        let options = InputOptions {
            debug: false,
            completed: store.completed_identifiers().unwrap().into_iter().collect(),
        };
        let list = read_repo_list(&list_path, &options).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.repos.len(), 1);
        assert_eq!(list.repos[0].url, "https://github.com/acme/shop");
    }
}
