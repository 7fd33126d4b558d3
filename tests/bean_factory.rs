use beanwire::{Args, BeanFactory, Component, ComponentDefinition, DefinitionStore, ResolveErrorKind, TypeDescriptor, TypeRegistry, Value};
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[derive(Default)]
struct Url {
    base: String,
}

#[derive(Default)]
struct Router {
    url: Option<Component<Url>>,
    routes: Vec<String>,
}

struct Database {
    dsn: String,
    charset: String,
}

struct DatabaseManager;

struct Session {
    database: Component<Database>,
    name: String,
    started: bool,
}

const DEFINITIONS: &str = r#"{
    "url": {
        "class": "\\hymie\\Url",
        "props": {"base": "https://example.com"}
    },
    "router": {
        "type": "hymie\\Router",
        "properties": {"url": "ref:url"},
        "postConstruct": {"add": ["/"], "addAll": [["/login", "/logout"]]}
    },
    "db": {
        "factoryType": "hymie\\DatabaseManager",
        "factoryMethod": "connect",
        "factoryMethodArgs": {"dsn": "mysql://localhost/app"},
        "properties": {"charset": "utf8mb4"}
    },
    "session": {
        "type": "hymie\\Session",
        "constructorArgs": ["ref:db", "SID"],
        "postConstruct": {"start": null}
    }
}"#;

fn registry(connections: Arc<AtomicUsize>) -> TypeRegistry {
    TypeRegistry::new()
        .register(
            TypeDescriptor::builder::<Url>("hymie\\Url")
                .default_constructor(|| Ok(Url::default()))
                .field("base", |url: &mut Url, value: Value| {
                    url.base = value.deserialize()?;
                    Ok(())
                })
                .build(),
        )
        .register(
            TypeDescriptor::builder::<Router>("hymie\\Router")
                .default_constructor(|| Ok(Router::default()))
                .field("url", |router: &mut Router, value: Value| {
                    router.url = Some(value.component()?);
                    Ok(())
                })
                .method("add", |router: &mut Router, args: Args| {
                    router.routes.push(args.nth(0).cloned().map(Value::deserialize).transpose()?.unwrap_or_default());
                    Ok(())
                })
                .method("addAll", |router: &mut Router, args: Args| {
                    let routes: Vec<String> = args.nth(0).cloned().map(Value::deserialize).transpose()?.unwrap_or_default();
                    router.routes.extend(routes);
                    Ok(())
                })
                .build(),
        )
        .register(
            TypeDescriptor::builder::<DatabaseManager>("hymie\\DatabaseManager")
                .static_method("connect", move |args: Args| {
                    connections.fetch_add(1, Ordering::SeqCst);
                    Ok(Component::new(Database {
                        dsn: args.deserialize("dsn")?,
                        charset: "latin1".to_owned(),
                    }))
                })
                .build(),
        )
        .register(
            TypeDescriptor::builder::<Database>("hymie\\Database")
                .field("charset", |database: &mut Database, value: Value| {
                    database.charset = value.deserialize()?;
                    Ok(())
                })
                .build(),
        )
        .register(
            TypeDescriptor::builder::<Session>("hymie\\Session")
                .constructor(|args: Args| {
                    Ok(Session {
                        database: args.nth(0).cloned().ok_or_else(|| anyhow::anyhow!("database required"))?.component()?,
                        name: args.nth(1).cloned().map(Value::deserialize).transpose()?.unwrap_or_default(),
                        started: false,
                    })
                })
                .method("start", |session: &mut Session, _args: Args| {
                    session.started = true;
                    Ok(())
                })
                .build(),
        )
}

fn factory(connections: Arc<AtomicUsize>) -> BeanFactory {
    BeanFactory::builder(registry(connections))
        .definitions(DefinitionStore::from_json(DEFINITIONS).unwrap())
        .build()
}

#[test]
fn test_application_wiring() {
    let connections = Arc::new(AtomicUsize::new(0));
    let factory = factory(connections.clone());

    let router = factory.get::<Router>("router").unwrap();
    let url = factory.get::<Url>("url").unwrap();
    let session = factory.get::<Session>("session").unwrap();
    let db = factory.get::<Database>("db").unwrap();

    assert!(router.read().url.as_ref().unwrap().ptr_eq(url.object()));
    assert_eq!(url.read().base, "https://example.com");
    assert_eq!(router.read().routes, ["/", "/login", "/logout"]);

    assert!(session.read().database.ptr_eq(db.object()));
    assert!(session.read().started);
    assert_eq!(session.read().name, "SID");
    assert_eq!(db.read().dsn, "mysql://localhost/app");
    assert_eq!(db.read().charset, "utf8mb4");
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[test]
fn test_runtime_definitions() {
    let factory = factory(Arc::default());

    assert!(factory.get_component("admin_router").is_none());

    factory.add_definitions([(
        "admin_router",
        ComponentDefinition::with_type("hymie\\Router")
            .property("url", "ref:url")
            .post_construct("add", json!("/admin")),
    )]);

    let admin = factory.get::<Router>("admin_router").unwrap();
    let router = factory.get::<Router>("router").unwrap();

    assert!(!admin.ptr_eq(router.object()));
    assert!(admin.read().url.as_ref().unwrap().ptr_eq(router.read().url.as_ref().unwrap().object()));
    assert_eq!(admin.read().routes, ["/admin"]);
}

#[test]
fn test_type_name_lookup() {
    let factory = factory(Arc::default());

    let url = factory.get_component_with("\\hymie\\Url", Args::new(), true).unwrap();

    assert!(url.ptr_eq(&factory.get_component("\\hymie\\Url").unwrap()));
    assert!(!url.ptr_eq(&factory.get_component("url").unwrap()));
    assert!(matches!(
        factory.try_get_component("hymie\\Missing"),
        Err(ResolveErrorKind::NotFound { .. })
    ));
}
