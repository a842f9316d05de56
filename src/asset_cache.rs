use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::http_client::HttpTransport;

pub type ItemCatalog = HashMap<String, ItemMeta>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ItemMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: ItemImage,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ItemImage {
    #[serde(default)]
    pub full: String,
}

/// Versioned item catalogs and icons under `<data-root>/items` and
/// `<data-root>/icons`. A file on disk is never refreshed: game versions are
/// immutable snapshots.
pub struct AssetCache<T> {
    transport: T,
    base_url: String,
    locale: String,
    items_dir: PathBuf,
    icons_dir: PathBuf,
    catalogs: HashMap<String, Rc<ItemCatalog>>,
}

impl<T: HttpTransport> AssetCache<T> {
    pub fn new(transport: T, base_url: &str, locale: &str, data_dir: &Path) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            locale: locale.to_string(),
            items_dir: data_dir.join("items"),
            icons_dir: data_dir.join("icons"),
            catalogs: HashMap::new(),
        }
    }

    pub fn catalog_path(&self, version: &str) -> PathBuf {
        self.items_dir.join(format!("items_{version}.json"))
    }

    pub fn icon_path(&self, version: &str, filename: &str) -> PathBuf {
        self.icons_dir.join(version).join(filename)
    }

    /// Item catalog for `version`; empty when it can be neither read nor
    /// fetched. The result is memoized for the lifetime of the cache.
    pub fn catalog(&mut self, version: &str) -> Rc<ItemCatalog> {
        if let Some(catalog) = self.catalogs.get(version) {
            return Rc::clone(catalog);
        }
        let catalog = match self.load_or_fetch_catalog(version) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(version, error = %format!("{err:#}"), "item catalog unavailable");
                ItemCatalog::new()
            }
        };
        let catalog = Rc::new(catalog);
        self.catalogs.insert(version.to_string(), Rc::clone(&catalog));
        catalog
    }

    /// Local path of the icon for `item`, downloading it on first use.
    /// Returns an empty string when the icon cannot be stored.
    pub fn icon(&self, item_id: &str, item: &ItemMeta, version: &str) -> String {
        let filename = item.image.full.trim();
        if !is_plain_filename(filename) {
            warn!(item_id, filename, "item has no usable icon filename");
            return String::new();
        }
        let path = self.icon_path(version, filename);
        if path.exists() {
            return path.to_string_lossy().into_owned();
        }
        match self.download_icon(version, filename, &path) {
            Ok(()) => path.to_string_lossy().into_owned(),
            Err(err) => {
                warn!(item_id, filename, error = %format!("{err:#}"), "icon download failed");
                String::new()
            }
        }
    }

    fn load_or_fetch_catalog(&self, version: &str) -> Result<ItemCatalog> {
        let path = self.catalog_path(version);
        if let Ok(raw) = fs::read(&path) {
            match parse_catalog(&raw) {
                Ok(catalog) => {
                    debug!(version, path = %path.display(), "item catalog loaded from disk");
                    return Ok(catalog);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %format!("{err:#}"), "cached catalog unreadable, refetching");
                }
            }
        }

        let url = format!(
            "{}/cdn/{version}/data/{}/item.json",
            self.base_url, self.locale
        );
        info!(version, url = %url, "downloading item catalog");
        let resp = self.transport.get(&url, &[])?;
        if !resp.is_success() {
            return Err(anyhow!("http {} for {url}", resp.status));
        }
        let doc: Value = serde_json::from_slice(&resp.body).context("invalid item.json")?;
        let catalog = catalog_from_value(&doc)?;
        let pretty = serde_json::to_vec_pretty(&doc).context("serialize item catalog")?;
        write_atomic(&path, &pretty)?;
        info!(version, path = %path.display(), items = catalog.len(), "item catalog saved");
        Ok(catalog)
    }

    fn download_icon(&self, version: &str, filename: &str, path: &Path) -> Result<()> {
        let url = format!("{}/cdn/{version}/img/item/{filename}", self.base_url);
        debug!(url = %url, "downloading item icon");
        let resp = self.transport.get(&url, &[])?;
        if !resp.is_success() {
            return Err(anyhow!("http {}", resp.status));
        }
        write_atomic(path, &resp.body)
    }
}

pub fn parse_catalog(raw: &[u8]) -> Result<ItemCatalog> {
    let doc: Value = serde_json::from_slice(raw).context("invalid catalog json")?;
    catalog_from_value(&doc)
}

fn catalog_from_value(doc: &Value) -> Result<ItemCatalog> {
    let data = doc
        .get("data")
        .and_then(Value::as_object)
        .context("catalog has no data object")?;
    Ok(data
        .iter()
        .filter_map(|(id, meta)| {
            let meta = ItemMeta::deserialize(meta).ok()?;
            Some((id.clone(), meta))
        })
        .collect())
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && name != ".." && !name.contains(['/', '\\'])
}

/// Writes through a sibling temp file so a crash never leaves a truncated
/// file at `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
