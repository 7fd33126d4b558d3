#![allow(dead_code)]

use beanwire::{Args, BeanFactory, DefinitionStore, Object, TypeDescriptor, TypeRegistry, Value};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

#[derive(Default)]
struct Node {
    label: String,
    peer: Option<Object>,
}

#[inline]
fn registry() -> TypeRegistry {
    TypeRegistry::new().register(
        TypeDescriptor::builder::<Node>("app::Node")
            .default_constructor(|| Ok(Node::default()))
            .constructor(|args: Args| {
                Ok(Node {
                    label: args.param(0, "label").cloned().map(Value::deserialize).transpose()?.unwrap_or_default(),
                    peer: args.param(1, "peer").and_then(Value::as_object).cloned(),
                })
            })
            .field("label", |node: &mut Node, value: Value| {
                node.label = value.deserialize()?;
                Ok(())
            })
            .field("peer", |node: &mut Node, value: Value| {
                node.peer = Some(value.into_object()?);
                Ok(())
            })
            .build(),
    )
}

#[inline]
fn factory() -> BeanFactory {
    let definitions = DefinitionStore::from_value(json!({
        "a": {"type": "app::Node", "constructorArgs": {"label": "a", "peer": "ref:b"}},
        "b": {"type": "app::Node", "properties": {"label": "b", "peer": "ref:c"}},
        "c": {"type": "app::Node", "properties": {"label": "c", "peer": "ref:d"}},
        "d": {"type": "app::Node", "properties": {"label": "d"}},
    }))
    .unwrap();

    BeanFactory::builder(registry()).definitions(definitions).build()
}

#[inline]
fn factory_get(factory: &BeanFactory) {
    let _ = factory.get_component("a").unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let cached = factory();
    factory_get(&cached);
    let fallback = factory();

    c.bench_function("factory_new", |b| b.iter(|| factory()))
        .bench_function("factory_get", |b| b.iter(|| factory_get(&factory())))
        .bench_function("factory_get_with_cache", |b| b.iter(|| factory_get(&cached)))
        .bench_function("factory_get_by_type_name", |b| {
            b.iter(|| fallback.get_component_with("app::Node", Args::new().with("label", json!("x")), false))
        });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
