use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use dimlight_core::{
    AssetStore, ColorStateList, DecodedImage, DesaturatedResources, EngineConfig,
    MemoryAssetStore, PlainResources, ResolveError, ResourceContext, ResourceId, Resources, Rgba,
    SourceFormat,
};

const RED: Rgba = [255, 0, 0, 255];

/// Wraps a store and counts image reads, which happen once per decode.
struct CountingStore {
    inner: MemoryAssetStore,
    reads: AtomicUsize,
}

impl CountingStore {
    fn new(inner: MemoryAssetStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            reads: AtomicUsize::new(0),
        })
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AssetStore for CountingStore {
    fn read(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<Arc<[u8]>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        // Widen the race window for concurrent callers.
        thread::sleep(std::time::Duration::from_millis(20));
        self.inner.read(id, ctx)
    }

    fn color(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<Rgba> {
        self.inner.color(id, ctx)
    }

    fn color_state_list(&self, id: &ResourceId, ctx: &ResourceContext) -> Option<ColorStateList> {
        self.inner.color_state_list(id, ctx)
    }
}

fn red_png() -> Vec<u8> {
    DecodedImage::solid(2, 2, RED, SourceFormat::Png)
        .encode()
        .expect("encode fixture")
}

fn fixture_store() -> Arc<CountingStore> {
    CountingStore::new(
        MemoryAssetStore::new()
            .with_image(42_u32, red_png())
            .with_image("corrupt", b"GIF89a truncated".to_vec()),
    )
}

fn dark_half_gray(store: Arc<CountingStore>) -> DesaturatedResources {
    let config = EngineConfig {
        dark_mode: true,
        darkness_amount: 0.5,
        saturation_amount: 1.0,
        ..Default::default()
    };
    DesaturatedResources::new(&config, store, ResourceContext::default())
}

#[test]
fn red_asset_resolves_to_dark_gray() {
    let res = dark_half_gray(fixture_store());
    let image = res.resolve(&ResourceId::Int(42)).unwrap();

    assert_eq!((image.width(), image.height()), (2, 2));
    assert_eq!(image.format(), SourceFormat::Png);
    assert_eq!(image.pixels(), &[[38, 38, 38, 255]; 4]);
    assert!(image.params().dark_mode());
}

#[test]
fn sequential_resolves_decode_once() {
    let store = fixture_store();
    let res = dark_half_gray(Arc::clone(&store));
    let id = ResourceId::Int(42);

    let first = res.resolve(&id).unwrap();
    let second = res.resolve(&id).unwrap();

    assert_eq!(first.pixels(), second.pixels());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.reads(), 1);
    assert_eq!(res.cache_stats().misses, 1);
    assert_eq!(res.cache_stats().hits, 1);
}

#[test]
fn concurrent_resolves_decode_once() {
    const CALLERS: usize = 12;
    let store = fixture_store();
    let res = dark_half_gray(Arc::clone(&store));
    let barrier = Barrier::new(CALLERS);

    let images: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    res.resolve(&ResourceId::Int(42))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(store.reads(), 1);
    let first = images[0].as_ref().unwrap();
    for image in &images {
        assert!(Arc::ptr_eq(first, image.as_ref().unwrap()));
    }
}

#[test]
fn missing_id_is_not_found_and_not_cached() {
    let res = dark_half_gray(fixture_store());
    let id = ResourceId::Int(9999);

    assert_eq!(res.resolve(&id), Err(ResolveError::ResourceNotFound(id.clone())));
    assert!(!res.is_cached(&id));
    assert_eq!(res.cached_images(), 0);
}

#[test]
fn corrupt_asset_fails_every_time() {
    let store = fixture_store();
    let res = dark_half_gray(Arc::clone(&store));
    let id = ResourceId::from("corrupt");

    for _ in 0..2 {
        let err = res.resolve(&id).unwrap_err();
        assert!(matches!(err, ResolveError::Decode { .. }), "{err}");
    }
    // Failures are not cached, so each call reads again.
    assert_eq!(store.reads(), 2);
    assert_eq!(res.cache_stats().failures, 2);
}

#[test]
fn toggling_dark_mode_uses_a_fresh_provider() {
    let store = fixture_store();
    let light = DesaturatedResources::with_params(
        false,
        0.5,
        0.0,
        Arc::clone(&store) as Arc<dyn AssetStore>,
        ResourceContext::default(),
    );
    let dark = dark_half_gray(Arc::clone(&store));

    let id = ResourceId::Int(42);
    assert_eq!(light.resolve(&id).unwrap().pixels(), &[RED; 4]);
    assert_eq!(dark.resolve(&id).unwrap().pixels(), &[[38, 38, 38, 255]; 4]);
    assert_ne!(light.params(), dark.params());
}

#[test]
fn providers_are_interchangeable_behind_the_trait() {
    let store: Arc<dyn AssetStore> = fixture_store();
    let providers: Vec<Box<dyn Resources>> = vec![
        Box::new(PlainResources::new(Arc::clone(&store), ResourceContext::default())),
        Box::new(DesaturatedResources::with_params(
            true,
            1.0,
            0.0,
            Arc::clone(&store),
            ResourceContext::default(),
        )),
    ];

    let resolved: Vec<_> = providers
        .iter()
        .map(|p| p.resolve(&ResourceId::Int(42)).unwrap().pixels()[0])
        .collect();
    assert_eq!(resolved, vec![RED, [0, 0, 0, 255]]);
}

#[test]
fn out_of_range_config_is_clamped() {
    let config = EngineConfig::from_json(
        r#"{"dark_mode": true, "darkness_amount": 4.0, "saturation_amount": -1.0}"#,
    )
    .unwrap();
    let res = DesaturatedResources::new(&config, fixture_store(), ResourceContext::default());

    assert_eq!(res.params().darkness_amount(), 1.0);
    assert_eq!(res.params().saturation_amount(), 0.0);
    assert_eq!(res.resolve(&ResourceId::Int(42)).unwrap().pixels(), &[[0, 0, 0, 255]; 4]);
}
