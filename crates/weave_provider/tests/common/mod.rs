//! Shared fixtures for provider integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use weave_common::{MetadataId, ProviderClass, TypeRef};
use weave_compose::{
    ArtifactWriter, AugmentationMembers, Composer, FieldMember, MemoryFileLayer, MethodMember,
};
use weave_metadata::{
    DiscoveryListener, EngineError, MetadataEngine, NotificationListener,
};
use weave_provider::{AugmentationProvider, ComputeContext, IncrementalProvider};
use weave_source::{GovernorDetails, MemorySourceLayer};

pub const SRC: &str = "src";

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An engine over in-memory source and file layers.
pub struct Fixture {
    pub engine: MetadataEngine,
    pub source: Rc<MemorySourceLayer>,
    pub files: Rc<MemoryFileLayer>,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            engine: MetadataEngine::default(),
            source: Rc::new(MemorySourceLayer::new()),
            files: Rc::new(MemoryFileLayer::new()),
        }
    }

    /// Wraps and registers a provider, returning the wrapper.
    pub fn register<P: AugmentationProvider + 'static>(
        &self,
        provider: P,
    ) -> Rc<IncrementalProvider<P>> {
        let wrapped = Rc::new(IncrementalProvider::new(
            provider,
            self.source.clone(),
            ArtifactWriter::new(self.files.clone(), "aug"),
            Composer::default(),
        ));
        self.engine
            .register_provider(wrapped.clone())
            .expect("provider registers");
        wrapped
    }

    /// Replaces a governor and announces the change.
    pub fn put(&self, governor: GovernorDetails) -> Result<(), EngineError> {
        let (path, name) = (governor.path.clone(), governor.qualified_name.clone());
        self.source.insert(governor);
        weave_provider::notify_governor_changed(&self.engine, &path, &name)
    }

    /// Removes a governor and announces the change.
    pub fn drop_governor(&self, qualified_name: &str) -> Result<(), EngineError> {
        self.source.remove(SRC, qualified_name);
        weave_provider::notify_governor_changed(&self.engine, SRC, qualified_name)
    }

    pub fn artifact(&self, relative: &str) -> Option<String> {
        self.files.contents(&PathBuf::from(relative))
    }
}

pub fn governor(qualified_name: &str) -> GovernorDetails {
    let file = format!("{SRC}/{}.decl.toml", qualified_name.replace('.', "/"));
    GovernorDetails::new(SRC, qualified_name, file)
}

pub fn string() -> TypeRef {
    TypeRef::new("java.lang.String")
}

pub fn class(name: &str) -> ProviderClass {
    ProviderClass::new(name).expect("valid provider class")
}

pub fn instance(class_name: &str, qualified_name: &str) -> MetadataId {
    class(class_name)
        .instance_id(SRC, qualified_name)
        .expect("valid instance id")
}

/// Records which MIDs a provider computed.
#[derive(Default)]
pub struct Log {
    computed: RefCell<Vec<MetadataId>>,
}

impl Log {
    pub fn record(&self, mid: &MetadataId) {
        self.computed.borrow_mut().push(mid.clone());
    }

    pub fn count(&self, mid: &MetadataId) -> usize {
        self.computed.borrow().iter().filter(|m| *m == mid).count()
    }

    pub fn total(&self) -> usize {
        self.computed.borrow().len()
    }
}

/// Re-declares every governor field, sorted by name.
pub struct CopyFields {
    pub class: ProviderClass,
    pub suffix: String,
    pub markers: Vec<String>,
    pub log: Rc<Log>,
    pub fail: Rc<Cell<bool>>,
}

impl CopyFields {
    pub fn new(class_name: &str, suffix: &str, marker: &str) -> Self {
        Self {
            class: class(class_name),
            suffix: suffix.to_string(),
            markers: vec![marker.to_string()],
            log: Rc::new(Log::default()),
            fail: Rc::new(Cell::new(false)),
        }
    }
}

impl AugmentationProvider for CopyFields {
    fn provider_class(&self) -> &ProviderClass {
        &self.class
    }

    fn artifact_suffix(&self) -> &str {
        &self.suffix
    }

    fn trigger_markers(&self) -> &[String] {
        &self.markers
    }

    fn compute(
        &self,
        ctx: &ComputeContext<'_>,
        governor: &GovernorDetails,
    ) -> Result<Option<AugmentationMembers>, EngineError> {
        self.log.record(ctx.mid());
        if self.fail.get() {
            return Err(ctx.fail("refusing to copy fields"));
        }
        let mut members = AugmentationMembers::new();
        let mut fields: Vec<_> = governor.fields.iter().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        for field in fields {
            members
                .fields
                .push(FieldMember::new(field.ty.clone(), field.name.clone()));
        }
        Ok(Some(members))
    }
}

/// Reads another provider's item for the same governor through a registered
/// dependency and emits one getter per field it found there.
pub struct Getters {
    pub class: ProviderClass,
    pub upstream: ProviderClass,
    pub markers: Vec<String>,
    pub log: Rc<Log>,
}

impl Getters {
    pub fn new(class_name: &str, upstream: &str, marker: &str) -> Self {
        Self {
            class: class(class_name),
            upstream: class(upstream),
            markers: vec![marker.to_string()],
            log: Rc::new(Log::default()),
        }
    }
}

fn getters_for(members: Option<&AugmentationMembers>) -> AugmentationMembers {
    let mut out = AugmentationMembers::new();
    for field in members.map(|m| m.fields.as_slice()).unwrap_or_default() {
        let mut name = String::from("get");
        name.push_str(&field.name[..1].to_uppercase());
        name.push_str(&field.name[1..]);
        out.methods.push(MethodMember::public(
            field.ty.clone(),
            name,
            Vec::new(),
            vec![format!("return this.{};", field.name)],
        ));
    }
    out
}

impl AugmentationProvider for Getters {
    fn provider_class(&self) -> &ProviderClass {
        &self.class
    }

    fn artifact_suffix(&self) -> &str {
        "Getters"
    }

    fn trigger_markers(&self) -> &[String] {
        &self.markers
    }

    fn compute(
        &self,
        ctx: &ComputeContext<'_>,
        _governor: &GovernorDetails,
    ) -> Result<Option<AugmentationMembers>, EngineError> {
        self.log.record(ctx.mid());
        let Some(upstream) = ctx.mid().with_class(&self.upstream) else {
            return Ok(None);
        };
        let item = ctx.get(&upstream)?;
        Ok(Some(getters_for(item.members())))
    }
}

/// Like [`Getters`], but only peeks at the upstream item and learns about
/// changes through a [`DiscoveryListener`].
pub struct DiscoveredGetters {
    pub class: ProviderClass,
    pub upstream: ProviderClass,
    pub markers: Vec<String>,
    pub log: Rc<Log>,
    pub when_unmatched: bool,
}

impl DiscoveredGetters {
    pub fn new(class_name: &str, upstream: &str, marker: &str) -> Self {
        Self {
            class: class(class_name),
            upstream: class(upstream),
            markers: vec![marker.to_string()],
            log: Rc::new(Log::default()),
            when_unmatched: false,
        }
    }

    /// Also recomputes when the upstream loses its fields.
    pub fn retracting(mut self) -> Self {
        self.when_unmatched = true;
        self
    }
}

impl AugmentationProvider for DiscoveredGetters {
    fn provider_class(&self) -> &ProviderClass {
        &self.class
    }

    fn artifact_suffix(&self) -> &str {
        "Discovered"
    }

    fn trigger_markers(&self) -> &[String] {
        &self.markers
    }

    fn compute(
        &self,
        ctx: &ComputeContext<'_>,
        _governor: &GovernorDetails,
    ) -> Result<Option<AugmentationMembers>, EngineError> {
        self.log.record(ctx.mid());
        let peeked = ctx
            .mid()
            .with_class(&self.upstream)
            .and_then(|upstream| ctx.peek(&upstream));
        Ok(Some(getters_for(peeked.as_ref().and_then(|i| i.members()))))
    }

    fn listeners(&self) -> Vec<Rc<dyn NotificationListener>> {
        let listener = DiscoveryListener::new(
            format!("{}-discovery", self.class),
            self.class.clone(),
            |members| !members.fields.is_empty(),
        );
        let listener = if self.when_unmatched {
            listener.also_when_unmatched()
        } else {
            listener
        };
        vec![Rc::new(listener)]
    }
}
