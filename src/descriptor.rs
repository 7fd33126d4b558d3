use core::{any::type_name, fmt, marker::PhantomData};
use std::collections::HashMap;

use crate::{
    any::{Object, TypeInfo},
    errors::InstantiateErrorKind,
    service::{service_fn, BoxCloneService, Service as _},
    value::{Args, Value},
};

type DefaultConstructor = BoxCloneService<(), Object, InstantiateErrorKind>;
type Constructor = BoxCloneService<Args, Object, InstantiateErrorKind>;
type InstanceSetter = BoxCloneService<(Object, Value), (), InstantiateErrorKind>;
type StaticSetter = BoxCloneService<Value, (), InstantiateErrorKind>;
type InstanceMethod = BoxCloneService<(Object, Args), Value, InstantiateErrorKind>;
type StaticMethod = BoxCloneService<Args, Value, InstantiateErrorKind>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Clone)]
enum Setter {
    Instance(InstanceSetter),
    Static(StaticSetter),
}

/// Settable field of a registered type
#[derive(Clone)]
pub struct Field {
    visibility: Visibility,
    setter: Setter,
}

impl Field {
    #[inline]
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.setter, Setter::Static(_))
    }

    /// Static fields are set on the type, `instance` is ignored for them
    pub(crate) fn set(&self, instance: &Object, value: Value) -> Result<(), InstantiateErrorKind> {
        match &self.setter {
            Setter::Instance(setter) => setter.clone().call((instance.clone(), value)),
            Setter::Static(setter) => setter.clone().call(value),
        }
    }
}

#[derive(Clone)]
enum MethodKind {
    Instance(InstanceMethod),
    Static(StaticMethod),
}

/// Callable method of a registered type
#[derive(Clone)]
pub struct Method {
    name: String,
    kind: MethodKind,
}

impl Method {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.kind, MethodKind::Static(_))
    }

    /// Invokes the method. Static methods ignore `receiver`, instance methods require it.
    pub(crate) fn invoke(&self, receiver: Option<&Object>, args: Args) -> Result<Value, InstantiateErrorKind> {
        match (&self.kind, receiver) {
            (MethodKind::Static(method), _) => method.clone().call(args),
            (MethodKind::Instance(method), Some(receiver)) => method.clone().call((receiver.clone(), args)),
            (MethodKind::Instance(_), None) => Err(InstantiateErrorKind::NoReceiver {
                method: self.name.clone(),
            }),
        }
    }
}

/// Everything the factory can do with a type: create it, set its fields and call its methods.
///
/// Descriptors replace runtime reflection. They are built once with [`TypeDescriptor::builder`]
/// and registered under a qualified name in a [`crate::TypeRegistry`].
pub struct TypeDescriptor {
    name: String,
    type_info: TypeInfo,
    default_constructor: Option<DefaultConstructor>,
    constructor: Option<Constructor>,
    fields: HashMap<String, Field>,
    methods: HashMap<String, Method>,
}

impl TypeDescriptor {
    #[inline]
    #[must_use]
    pub fn builder<T: Send + Sync + 'static>(name: impl Into<String>) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            descriptor: Self::opaque_named(name.into(), TypeInfo::of::<T>()),
            _marker: PhantomData,
        }
    }

    /// Descriptor of a type nothing is known about, except its runtime type info
    #[inline]
    #[must_use]
    pub fn opaque(type_info: TypeInfo) -> Self {
        Self::opaque_named(type_info.name.to_owned(), type_info)
    }

    fn opaque_named(name: String, type_info: TypeInfo) -> Self {
        Self {
            name,
            type_info,
            default_constructor: None,
            constructor: None,
            fields: HashMap::new(),
            methods: HashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    #[inline]
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    #[inline]
    #[must_use]
    pub const fn is_instantiable(&self) -> bool {
        self.default_constructor.is_some() || self.constructor.is_some()
    }

    /// Creates an instance without arguments.
    /// Uses the default constructor, or the argument constructor with empty arguments.
    ///
    /// # Errors
    /// Returns [`InstantiateErrorKind::NoConstructor`] if the type has no constructor,
    /// otherwise the constructor's error
    pub fn new_instance(&self) -> Result<Object, InstantiateErrorKind> {
        match (&self.default_constructor, &self.constructor) {
            (Some(constructor), _) => constructor.clone().call(()),
            (None, Some(constructor)) => constructor.clone().call(Args::new()),
            (None, None) => Err(InstantiateErrorKind::NoConstructor {
                type_name: self.name.clone(),
            }),
        }
    }

    /// Creates an instance passing arguments to the argument constructor.
    ///
    /// # Errors
    /// Returns [`InstantiateErrorKind::UnexpectedArguments`] if the type only has a default constructor
    /// and arguments are given, otherwise the same as [`Self::new_instance`]
    pub fn new_instance_args(&self, args: Args) -> Result<Object, InstantiateErrorKind> {
        match &self.constructor {
            Some(constructor) => constructor.clone().call(args),
            None if args.is_empty() => self.new_instance(),
            None if self.default_constructor.is_some() => Err(InstantiateErrorKind::UnexpectedArguments {
                type_name: self.name.clone(),
                count: args.len(),
            }),
            None => Err(InstantiateErrorKind::NoConstructor {
                type_name: self.name.clone(),
            }),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = self.fields.keys().collect::<Vec<_>>();
        fields.sort();
        let mut methods = self.methods.keys().collect::<Vec<_>>();
        methods.sort();

        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_info.name)
            .field("instantiable", &self.is_instantiable())
            .field("fields", &fields)
            .field("methods", &methods)
            .finish()
    }
}

pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypeDescriptorBuilder<T> {
    #[must_use]
    pub fn default_constructor<F>(mut self, mut f: F) -> Self
    where
        F: FnMut() -> anyhow::Result<T> + Clone + Send + Sync + 'static,
    {
        self.descriptor.default_constructor = Some(BoxCloneService::new(service_fn(move |()| {
            f().map(Object::new).map_err(InstantiateErrorKind::Custom)
        })));
        self
    }

    /// Constructor receiving resolved arguments, by name or by position
    #[must_use]
    pub fn constructor<F>(mut self, mut f: F) -> Self
    where
        F: FnMut(Args) -> anyhow::Result<T> + Clone + Send + Sync + 'static,
    {
        self.descriptor.constructor = Some(BoxCloneService::new(service_fn(move |args: Args| {
            f(args).map(Object::new).map_err(InstantiateErrorKind::Custom)
        })));
        self
    }

    #[must_use]
    pub fn field<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&mut T, Value) -> anyhow::Result<()> + Clone + Send + Sync + 'static,
    {
        self.instance_field(name.into(), Visibility::Public, f)
    }

    /// Field that isn't publicly accessible, access to it is forced on binding
    #[must_use]
    pub fn private_field<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&mut T, Value) -> anyhow::Result<()> + Clone + Send + Sync + 'static,
    {
        self.instance_field(name.into(), Visibility::Private, f)
    }

    /// Field of the type itself, not of its instances
    #[must_use]
    pub fn static_field<F>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(Value) -> anyhow::Result<()> + Clone + Send + Sync + 'static,
    {
        let setter = BoxCloneService::new(service_fn(move |value: Value| f(value).map_err(InstantiateErrorKind::Custom)));
        self.descriptor.fields.insert(
            name.into(),
            Field {
                visibility: Visibility::Public,
                setter: Setter::Static(setter),
            },
        );
        self
    }

    #[must_use]
    pub fn method<F, R>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(&mut T, Args) -> anyhow::Result<R> + Clone + Send + Sync + 'static,
        R: Into<Value>,
    {
        let method = BoxCloneService::new(service_fn(move |(receiver, args): (Object, Args)| {
            let mut instance = receiver.write::<T>().ok_or_else(|| InstantiateErrorKind::IncorrectType {
                expected: type_name::<T>(),
                actual: receiver.type_info().name,
            })?;
            f(&mut *instance, args).map(Into::into).map_err(InstantiateErrorKind::Custom)
        }));
        let name = name.into();
        self.descriptor.methods.insert(
            name.clone(),
            Method {
                name,
                kind: MethodKind::Instance(method),
            },
        );
        self
    }

    #[must_use]
    pub fn static_method<F, R>(mut self, name: impl Into<String>, mut f: F) -> Self
    where
        F: FnMut(Args) -> anyhow::Result<R> + Clone + Send + Sync + 'static,
        R: Into<Value>,
    {
        let method = BoxCloneService::new(service_fn(move |args: Args| {
            f(args).map(Into::into).map_err(InstantiateErrorKind::Custom)
        }));
        let name = name.into();
        self.descriptor.methods.insert(
            name.clone(),
            Method {
                name,
                kind: MethodKind::Static(method),
            },
        );
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }

    fn instance_field<F>(mut self, name: String, visibility: Visibility, mut f: F) -> Self
    where
        F: FnMut(&mut T, Value) -> anyhow::Result<()> + Clone + Send + Sync + 'static,
    {
        let setter = BoxCloneService::new(service_fn(move |(receiver, value): (Object, Value)| {
            let mut instance = receiver.write::<T>().ok_or_else(|| InstantiateErrorKind::IncorrectType {
                expected: type_name::<T>(),
                actual: receiver.type_info().name,
            })?;
            f(&mut *instance, value).map_err(InstantiateErrorKind::Custom)
        }));
        self.descriptor.fields.insert(
            name,
            Field {
                visibility,
                setter: Setter::Instance(setter),
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    use super::{TypeDescriptor, Visibility};
    use crate::{
        any::{Object, TypeInfo},
        errors::InstantiateErrorKind,
        value::{Args, Value},
    };

    #[derive(Default)]
    struct Mailer {
        host: String,
        port: u16,
        secret: Option<String>,
    }

    fn mailer_descriptor(limit: Arc<AtomicU32>) -> TypeDescriptor {
        TypeDescriptor::builder::<Mailer>("app::Mailer")
            .constructor(|args: Args| {
                Ok(Mailer {
                    host: args.deserialize("host")?,
                    port: args.param(1, "port").cloned().map(Value::deserialize).transpose()?.unwrap_or(25),
                    secret: None,
                })
            })
            .field("port", |mailer: &mut Mailer, value: Value| {
                mailer.port = value.deserialize()?;
                Ok(())
            })
            .private_field("secret", |mailer: &mut Mailer, value: Value| {
                mailer.secret = Some(value.deserialize()?);
                Ok(())
            })
            .static_field("limit", move |value: Value| {
                limit.store(value.deserialize()?, Ordering::SeqCst);
                Ok(())
            })
            .method("address", |mailer: &mut Mailer, _args: Args| {
                Ok(Value::from(json!(format!("{}:{}", mailer.host, mailer.port))))
            })
            .static_method("localhost", |_args: Args| Ok(Object::new(Mailer::default())))
            .build()
    }

    #[test]
    fn test_constructors() {
        let descriptor = mailer_descriptor(Arc::default());

        let mailer = descriptor
            .new_instance_args(Args::new().with("host", json!("smtp")).with_positional(json!(2525)))
            .unwrap();
        assert_eq!(mailer.read::<Mailer>().unwrap().host, "smtp");
        assert_eq!(mailer.read::<Mailer>().unwrap().port, 2525);

        // No default constructor, so the argument constructor is called with empty arguments
        assert!(matches!(descriptor.new_instance(), Err(InstantiateErrorKind::Custom(_))));
    }

    #[test]
    fn test_default_constructor_rejects_arguments() {
        let descriptor = TypeDescriptor::builder::<Mailer>("app::Mailer")
            .default_constructor(|| Ok(Mailer::default()))
            .build();

        assert!(descriptor.new_instance().is_ok());
        assert!(descriptor.new_instance_args(Args::new()).is_ok());
        assert!(matches!(
            descriptor.new_instance_args(Args::new().with("host", json!("smtp"))),
            Err(InstantiateErrorKind::UnexpectedArguments { count: 1, .. })
        ));
        assert!(matches!(
            TypeDescriptor::opaque(TypeInfo::of::<Mailer>()).new_instance(),
            Err(InstantiateErrorKind::NoConstructor { .. })
        ));
    }

    #[test]
    fn test_fields_and_methods() {
        let limit = Arc::new(AtomicU32::new(0));
        let descriptor = mailer_descriptor(limit.clone());
        let mailer = Object::new(Mailer {
            host: "smtp".to_owned(),
            ..Mailer::default()
        });

        descriptor.field("port").unwrap().set(&mailer, json!(587).into()).unwrap();
        descriptor.field("secret").unwrap().set(&mailer, json!("s3cr3t").into()).unwrap();
        descriptor.field("limit").unwrap().set(&mailer, json!(10).into()).unwrap();

        assert_eq!(descriptor.field("secret").unwrap().visibility(), Visibility::Private);
        assert!(descriptor.field("limit").unwrap().is_static());
        assert_eq!(mailer.read::<Mailer>().unwrap().secret.as_deref(), Some("s3cr3t"));
        assert_eq!(limit.load(Ordering::SeqCst), 10);

        let address = descriptor.method("address").unwrap().invoke(Some(&mailer), Args::new()).unwrap();
        assert_eq!(address.as_literal(), Some(&json!("smtp:587")));

        let localhost = descriptor.method("localhost").unwrap();
        assert!(localhost.is_static());
        assert!(localhost.invoke(None, Args::new()).unwrap().as_object().unwrap().is::<Mailer>());

        assert!(matches!(
            descriptor.method("address").unwrap().invoke(None, Args::new()),
            Err(InstantiateErrorKind::NoReceiver { .. })
        ));
        assert!(matches!(
            descriptor.field("port").unwrap().set(&Object::new(0u8), json!(1).into()),
            Err(InstantiateErrorKind::IncorrectType { .. })
        ));
    }
}
