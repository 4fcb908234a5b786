//! Descriptor classification by file extension
//!
//! Each project-relative path maps to a descriptor kind that decides which
//! file carries the descriptor text (the asset itself or its `.meta`
//! sidecar), whether the text is scanned for sub-object boundaries, and
//! whether grouping tags and recycled-name tables apply. Unknown extensions
//! fall back to the sidecar multi-object kind so analysis degrades
//! gracefully instead of failing.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::path::Path;

/// Prefix of all indexed asset paths
pub const ASSETS_PREFIX: &str = "Assets/";

/// Folder whose contents ship verbatim with the build
pub const STREAMING_ASSETS_PREFIX: &str = "Assets/StreamingAssets/";

/// How a path's descriptor text is obtained and scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// Own content is the descriptor; single object (scenes, prefabs, ...)
    Text,
    /// Own content is the descriptor; multiple `--- !u!` sub-objects
    TextMulti,
    /// Only the sidecar is descriptor text; single object (raw text,
    /// shaders, directories, streaming files)
    Meta,
    /// Only the sidecar is descriptor text; multiple sub-objects.
    /// Default for unknown extensions.
    MetaMulti,
    /// Imported binary media; sidecar text with grouping tags and a
    /// recycled-name table instead of sub-object delimiters
    Import,
    /// Source code; never parsed for references
    Source,
}

impl DescriptorKind {
    /// The file whose text is scanned for this kind, if any
    pub fn descriptor_path(&self, path: &str) -> Option<String> {
        match self {
            DescriptorKind::Text | DescriptorKind::TextMulti => Some(path.to_string()),
            DescriptorKind::Meta | DescriptorKind::MetaMulti | DescriptorKind::Import => {
                Some(format!("{path}.meta"))
            }
            DescriptorKind::Source => None,
        }
    }

    /// Whether `--- !u!` sub-object delimiter lines open new scopes
    pub fn supports_sub_objects(&self) -> bool {
        matches!(self, DescriptorKind::TextMulti | DescriptorKind::MetaMulti)
    }

    /// Whether `spritePackingTag:` lines are honored
    pub fn supports_packing_tag(&self) -> bool {
        matches!(self, DescriptorKind::Import)
    }

    /// Whether a trailing `fileIDToRecycleName:` table names sub-objects
    pub fn supports_recycled_names(&self) -> bool {
        matches!(self, DescriptorKind::Import)
    }
}

/// Process-wide immutable extension rules. Read-only after initialization,
/// so sharing across analyzer instances is safe.
static EXTENSION_KINDS: Lazy<AHashMap<&'static str, DescriptorKind>> = Lazy::new(|| {
    const TEXT: &[&str] = &[
        "prefab",
        "unity",
        "giparams",
        "physicMaterial",
        "physicsMaterial2D",
        "renderTexture",
    ];
    const TEXT_MULTI: &[&str] = &[
        "anim",
        "asset",
        "colors",
        "controller",
        "cubemap",
        "curves",
        "curvesnormalized",
        "flare",
        "gradients",
        "guiskin",
        "hdr",
        "mask",
        "mat",
        "materiali",
        "mixer",
        "overrideController",
        "particlecurves",
        "particlecurvessigned",
        "particledoublecurves",
        "particledoublecurvessigned",
        "prefs",
        // font formats
        "dfont",
        "fnt",
        "fon",
        "fontsettings",
        "otf",
        "ttf",
    ];
    const META: &[&str] = &[
        "bytes", "cginc", "csv", "htm", "html", "json", "shader", "txt", "xml", "yaml",
    ];
    const IMPORT: &[&str] = &[
        // models
        "3df", "3dm", "3dmf", "3ds", "3dv", "3dx", "blend", "c4d", "fbx", "lwo", "lws", "ma",
        "max", "mb", "mesh", "obj", "vrl", "wrl", "wrz",
        // images
        "ai", "apng", "bmp", "cdr", "dib", "eps", "exif", "exr", "gif", "ico", "icon", "iff",
        "j", "j2c", "j2k", "jas", "jiff", "jng", "jp2", "jpc", "jpf", "jpg", "jpeg", "jpe",
        "jpw", "jpx", "jtf", "mac", "omf", "pic", "pict", "png", "psd", "qif", "qti", "qtif",
        "tex", "tfw", "tga", "tif", "tiff", "wmf",
        // audio
        "aac", "aif", "aiff", "au", "it", "mid", "midi", "mod", "mp3", "mpa", "ogg", "ra",
        "ram", "s3m", "wav", "wave", "wma", "xm",
        // video
        "asf", "asx", "avi", "dat", "divx", "dvx", "m2l", "m2t", "m2ts", "m2v", "m4e", "m4v",
        "mjp", "mlv", "mov", "movie", "mp21", "mp4", "mpg", "mpeg", "mpe", "mpv2", "ogm", "qt",
        "rm", "rmvb", "wmw", "xvid",
    ];
    const SOURCE: &[&str] = &["cs", "js"];

    let mut map = AHashMap::new();
    for (extensions, kind) in [
        (TEXT, DescriptorKind::Text),
        (TEXT_MULTI, DescriptorKind::TextMulti),
        (META, DescriptorKind::Meta),
        (IMPORT, DescriptorKind::Import),
        (SOURCE, DescriptorKind::Source),
    ] {
        for ext in extensions {
            map.insert(*ext, kind);
        }
    }
    map
});

/// Classify a project-relative path.
///
/// Streaming-asset paths are always sidecar-only regardless of extension.
/// Directories and extension-less files are sidecar-only too; any other
/// unknown extension gets the safe multi-object sidecar default.
pub fn classify(path: &str, is_directory: bool) -> DescriptorKind {
    if path.starts_with(STREAMING_ASSETS_PREFIX) {
        return DescriptorKind::Meta;
    }

    let ext = match path.rfind('.') {
        Some(dot) => &path[dot + 1..],
        None => "",
    };

    if let Some(kind) = EXTENSION_KINDS.get(ext) {
        return *kind;
    }

    if is_directory {
        DescriptorKind::Meta
    } else {
        log::trace!("unknown descriptor extension {ext:?} for {path}");
        DescriptorKind::MetaMulti
    }
}

/// Classify a path, probing the filesystem under `root` for directories
pub fn classify_at(root: &Path, path: &str) -> DescriptorKind {
    classify(path, root.join(path).is_dir())
}
