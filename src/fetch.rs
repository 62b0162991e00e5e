use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::io::Write as _;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::Html;
use url::Url;

use crate::{Console, Result};

static USER_AGENT: &str = concat!("snatch/", env!("CARGO_PKG_VERSION"));
static TIMEOUT: Duration = Duration::from_secs(30);

/// Fetched document, as the cache stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    status: StatusCode,
    text: String,
}

impl Page {
    pub fn new(status: StatusCode, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.text)
    }
}

pub trait Fetch {
    fn fetch(&self, url: &Url, cnsl: &mut Console) -> Result<Page>;
}

/// Fetch layer backed by a blocking reqwest client.
pub struct HttpFetch {
    client: Client,
}

impl HttpFetch {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Some(TIMEOUT))
            .build()
            .context("Could not setup http client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, url: &Url, cnsl: &mut Console) -> Result<Page> {
        write!(cnsl, "GET     {} ... ", url).unwrap_or(());
        let result = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("Could not fetch {}", url));
        match &result {
            Ok(res) => writeln!(cnsl, "{}", res.status()),
            Err(_) => writeln!(cnsl, "failed"),
        }
        .unwrap_or(());
        let res = result?;
        let status = res.status();
        let text = res.text()?;
        Ok(Page::new(status, text))
    }
}

/// URL-keyed memoization of fetched pages.
///
/// At most one underlying fetch per distinct URL within a single run.
/// Transport errors are not cached and propagate to the caller; there is no
/// retry and no cross-run persistence.
pub struct PageCache {
    fetch: Box<dyn Fetch>,
    pages: HashMap<Url, Page>,
}

impl PageCache {
    pub fn new(fetch: impl Fetch + 'static) -> Self {
        Self {
            fetch: Box::new(fetch),
            pages: HashMap::new(),
        }
    }

    pub fn get(&mut self, url: &Url, cnsl: &mut Console) -> Result<&Page> {
        match self.pages.entry(url.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let page = self.fetch.fetch(url, cnsl)?;
                Ok(entry.insert(page))
            }
        }
    }
}

impl fmt::Debug for PageCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PageCache")
            .field("pages", &self.pages.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    /// Serves canned pages and counts underlying fetches.
    #[derive(Debug, Clone, Default)]
    pub struct StubFetch {
        pages: HashMap<String, (u16, String)>,
        count: Rc<Cell<usize>>,
    }

    impl StubFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, status: u16, text: &str) -> Self {
            self.pages.insert(url.to_owned(), (status, text.to_owned()));
            self
        }

        pub fn counter(&self) -> Rc<Cell<usize>> {
            Rc::clone(&self.count)
        }
    }

    impl Fetch for StubFetch {
        fn fetch(&self, url: &Url, _cnsl: &mut Console) -> Result<Page> {
            self.count.set(self.count.get() + 1);
            match self.pages.get(url.as_str()) {
                Some((status, text)) => {
                    Ok(Page::new(StatusCode::from_u16(*status)?, text.clone()))
                }
                None => Ok(Page::new(StatusCode::NOT_FOUND, "")),
            }
        }
    }
}
