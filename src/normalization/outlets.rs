//! Outlet alias resolution.
//!
//! Lookup keys are built by [`outlet_key`]: lowercase, diacritics folded,
//! `&` spelled out, a leading "the" dropped, dots and apostrophes removed and
//! any other punctuation turned into a space. Both the built-in table and
//! `outlet-registry.json` feed the same maps; registry entries are applied
//! last and win on conflicts. A registry entry that claims a built-in
//! outlet's id, display name or domain replaces that outlet outright, so
//! every built-in spelling of it resolves to the registry id.

use crate::models::{OutletEntry, OutletRegistry, Review};
use crate::text::fold_diacritics;
use crate::utils::slugify;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use url::Url;

/// Aliases shorter than this are never fuzzy-matched ("ap" vs "am" is not a typo).
const FUZZY_MIN_KEY_LEN: usize = 8;
const FUZZY_MAX_DISTANCE: usize = 2;

struct BuiltinOutlet {
    id: &'static str,
    display: &'static str,
    tier: u8,
    aliases: &'static [&'static str],
    domains: &'static [&'static str],
}

const fn outlet(
    id: &'static str,
    display: &'static str,
    tier: u8,
    aliases: &'static [&'static str],
    domains: &'static [&'static str],
) -> BuiltinOutlet {
    BuiltinOutlet { id, display, tier, aliases, domains }
}

static BUILTIN_OUTLETS: &[BuiltinOutlet] = &[
    outlet("nytimes", "The New York Times", 1, &["NYT", "New York Times", "NY Times", "N.Y. Times", "The Times"], &["nytimes.com"]),
    outlet("washpost", "The Washington Post", 1, &["Washington Post", "WaPo", "Wash Post"], &["washingtonpost.com"]),
    outlet("wsj", "The Wall Street Journal", 1, &["Wall Street Journal", "WSJ", "Wall St Journal"], &["wsj.com"]),
    outlet("variety", "Variety", 1, &["Variety Magazine"], &["variety.com"]),
    outlet("hollywood-reporter", "The Hollywood Reporter", 1, &["Hollywood Reporter", "THR"], &["hollywoodreporter.com"]),
    outlet("vulture", "Vulture", 1, &["New York Magazine", "NY Mag", "New York Mag", "New York Magazine/Vulture", "Vulture/New York Magazine", "NYMag"], &["vulture.com", "nymag.com"]),
    outlet("guardian", "The Guardian", 1, &["Guardian", "The Guardian US", "Guardian US"], &["theguardian.com"]),
    outlet("timeout-ny", "Time Out New York", 1, &["Time Out", "Time Out NY", "TimeOut", "TimeOut New York"], &["timeout.com"]),
    outlet("ap", "Associated Press", 1, &["AP", "The Associated Press", "AP News"], &["apnews.com"]),
    outlet("financial-times", "Financial Times", 1, &["FT", "The Financial Times"], &["ft.com"]),
    outlet("telegraph", "The Telegraph", 1, &["Telegraph", "The Daily Telegraph"], &["telegraph.co.uk"]),
    outlet("nypost", "New York Post", 2, &["NY Post", "The New York Post", "N.Y. Post"], &["nypost.com"]),
    outlet("nydailynews", "New York Daily News", 2, &["NY Daily News", "Daily News", "The Daily News"], &["nydailynews.com"]),
    outlet("theatermania", "TheaterMania", 2, &["Theater Mania", "TheatreMania"], &["theatermania.com"]),
    outlet("deadline", "Deadline", 2, &["Deadline Hollywood"], &["deadline.com"]),
    outlet("usa-today", "USA Today", 2, &["USA TODAY", "USAToday"], &["usatoday.com"]),
    outlet("observer", "Observer", 2, &["New York Observer", "The Observer"], &["observer.com"]),
    outlet("thewrap", "TheWrap", 2, &["The Wrap", "Wrap"], &["thewrap.com"]),
    outlet("ew", "Entertainment Weekly", 2, &["EW"], &["ew.com"]),
    outlet("chicago-tribune", "Chicago Tribune", 2, &["The Chicago Tribune"], &["chicagotribune.com"]),
    outlet("rolling-stone", "Rolling Stone", 2, &[], &["rollingstone.com"]),
    outlet("nysr", "New York Stage Review", 2, &["NY Stage Review", "NYSR"], &["nystagereview.com"]),
    outlet("the-stage", "The Stage", 2, &["Stage"], &["thestage.co.uk"]),
    outlet("slant", "Slant Magazine", 2, &["Slant"], &["slantmagazine.com"]),
    outlet("amny", "amNewYork", 2, &["amNY", "AM New York", "amNewYork Metro"], &["amny.com"]),
    outlet("broadwayworld", "BroadwayWorld", 3, &["Broadway World", "BWW"], &["broadwayworld.com"]),
    outlet("theatrely", "Theatrely", 3, &[], &["theatrely.com"]),
    outlet("culture-sauce", "Culture Sauce", 3, &["CultureSauce"], &["culturesauce.com"]),
    outlet("ny-theatre-guide", "New York Theatre Guide", 3, &["NY Theatre Guide", "New York Theater Guide", "NYTG"], &["newyorktheatreguide.com"]),
    outlet("stage-and-cinema", "Stage and Cinema", 3, &["Stage & Cinema"], &["stageandcinema.com"]),
    outlet("broadway-news", "Broadway News", 3, &[], &["broadwaynews.com"]),
    outlet("nysun", "The New York Sun", 3, &["New York Sun", "NY Sun"], &["nysun.com"]),
];

/// Lookup key for an outlet spelling.
pub fn outlet_key(name: &str) -> String {
    let folded = fold_diacritics(&name.to_lowercase()).replace('&', " and ");
    let cleaned: String = folded
        .chars()
        .filter(|c| *c != '.' && *c != '\'' && *c != '’')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let words = match words.split_first() {
        Some((&"the", rest)) if !rest.is_empty() => rest,
        _ => &words[..],
    };
    words.join(" ")
}

fn domain_key(domain: &str) -> String {
    domain.trim().to_lowercase().trim_start_matches("www.").to_string()
}

/// Outcome of resolving one review's outlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletResolution {
    pub id: String,
    /// False when the id is only a slug of whatever name we were given.
    pub known: bool,
}

#[derive(Debug, Clone)]
struct OutletInfo {
    display: String,
    tier: Option<u8>,
}

/// Alias and domain tables for outlet normalization.
#[derive(Debug, Clone, Default)]
pub struct OutletResolver {
    aliases: BTreeMap<String, String>,
    domains: BTreeMap<String, String>,
    outlets: BTreeMap<String, OutletInfo>,
}

impl OutletResolver {
    /// Built-in tables merged with a registry; registry entries win.
    pub fn new(registry: &OutletRegistry) -> Self {
        let mut resolver = Self::default();
        for builtin in BUILTIN_OUTLETS {
            resolver.insert_outlet(
                builtin.id,
                builtin.display,
                Some(builtin.tier),
                builtin.aliases.iter().copied(),
                builtin.domains.iter().copied(),
            );
        }
        for (id, entry) in &registry.outlets {
            for builtin_id in resolver.claimed_builtins(id, entry, registry) {
                debug!(builtin = %builtin_id, registry_id = %id, "Registry entry replaces built-in outlet");
                resolver.absorb_outlet(&builtin_id, id);
            }
            resolver.insert_outlet(
                id,
                &entry.display_name,
                entry.tier,
                entry.aliases.iter().map(String::as_str),
                entry.domains.iter().map(String::as_str),
            );
        }
        resolver
    }

    fn insert_outlet<'a>(
        &mut self,
        id: &'a str,
        display: &'a str,
        tier: Option<u8>,
        aliases: impl Iterator<Item = &'a str>,
        domains: impl Iterator<Item = &'a str>,
    ) {
        let info = self.outlets.entry(id.to_string()).or_insert(OutletInfo {
            display: display.to_string(),
            tier,
        });
        if !display.is_empty() {
            info.display = display.to_string();
        }
        if tier.is_some() {
            info.tier = tier;
        }

        for alias in [id, display].into_iter().chain(aliases) {
            let key = outlet_key(alias);
            if !key.is_empty() {
                self.aliases.insert(key, id.to_string());
            }
        }
        for domain in domains {
            let domain = domain_key(domain);
            if !domain.is_empty() {
                self.domains.insert(domain, id.to_string());
            }
        }
    }

    /// Built-in outlets whose identity a registry entry claims: its id, its
    /// display name or one of its domains. A shared alias alone is not a claim.
    fn claimed_builtins(&self, id: &str, entry: &OutletEntry, registry: &OutletRegistry) -> BTreeSet<String> {
        let by_name = [id, entry.display_name.as_str()]
            .into_iter()
            .chain(entry.aliases.iter().map(String::as_str))
            .filter_map(|name| {
                let key = outlet_key(name);
                let target = self.aliases.get(&key)?;
                BUILTIN_OUTLETS
                    .iter()
                    .any(|b| b.id == target.as_str() && (outlet_key(b.id) == key || outlet_key(b.display) == key))
                    .then_some(target)
            });
        let by_domain = entry.domains.iter().filter_map(|d| self.domains.get(&domain_key(d)));

        by_name
            .chain(by_domain)
            .filter(|other| other.as_str() != id && !registry.outlets.contains_key(other.as_str()))
            .cloned()
            .collect()
    }

    /// Point every alias and domain of `old` at `new` and drop `old`.
    fn absorb_outlet(&mut self, old: &str, new: &str) {
        for target in self.aliases.values_mut().chain(self.domains.values_mut()) {
            if *target == old {
                *target = new.to_string();
            }
        }
        if let Some(info) = self.outlets.remove(old) {
            self.outlets.entry(new.to_string()).or_insert(info);
        }
    }

    /// Whether `id` is a canonical outlet id.
    pub fn is_known(&self, id: &str) -> bool {
        self.outlets.contains_key(id)
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.outlets.get(id).map(|o| o.display.as_str())
    }

    pub fn tier(&self, id: &str) -> Option<u8> {
        self.outlets.get(id).and_then(|o| o.tier)
    }

    /// Canonical id for an outlet spelling, if we recognise it.
    pub fn normalize_outlet(&self, name: &str) -> Option<String> {
        let key = outlet_key(name);
        if key.is_empty() {
            return None;
        }
        if let Some(id) = self.aliases.get(&key) {
            return Some(id.clone());
        }
        if key.len() < FUZZY_MIN_KEY_LEN {
            return None;
        }

        let best = self
            .aliases
            .iter()
            .filter(|(alias, _)| alias.len() >= FUZZY_MIN_KEY_LEN)
            .map(|(alias, id)| (strsim::levenshtein(&key, alias), alias, id))
            .filter(|(distance, _, _)| *distance <= FUZZY_MAX_DISTANCE)
            .min_by_key(|(distance, _, _)| *distance);

        best.map(|(distance, alias, id)| {
            debug!(name, alias = %alias, id = %id, distance, "Fuzzy matched outlet");
            id.clone()
        })
    }

    /// Canonical id for the site hosting a review URL.
    pub fn outlet_from_url(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let mut host = host.trim_start_matches("www.");
        loop {
            if let Some(id) = self.domains.get(host) {
                return Some(id.clone());
            }
            // Walk up to the parent domain: "theater.nytimes.com" -> "nytimes.com"
            match host.split_once('.') {
                Some((_, parent)) if parent.contains('.') => host = parent,
                _ => return None,
            }
        }
    }

    /// Best outlet id for a review: its outlet name, an already-canonical id,
    /// its URL, and finally a slug of whatever name it carries.
    pub fn resolve(&self, review: &Review) -> OutletResolution {
        if let Some(id) = self.normalize_outlet(&review.outlet) {
            return OutletResolution { id, known: true };
        }
        if self.is_known(&review.outlet_id) {
            return OutletResolution {
                id: review.outlet_id.clone(),
                known: true,
            };
        }
        if let Some(id) = self.normalize_outlet(&review.outlet_id) {
            return OutletResolution { id, known: true };
        }
        if let Some(id) = review.url.as_deref().and_then(|u| self.outlet_from_url(u)) {
            return OutletResolution { id, known: true };
        }

        let fallback = if review.outlet_id.trim().is_empty() {
            slugify(&review.outlet)
        } else {
            review.outlet_id.clone()
        };
        warn!(outlet = %review.outlet, outlet_id = %review.outlet_id, fallback = %fallback, "Unrecognised outlet");
        OutletResolution {
            id: fallback,
            known: false,
        }
    }
}
