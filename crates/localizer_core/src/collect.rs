use std::collections::{BTreeSet, HashMap};

use localizer_logging::{localizer_debug, localizer_warn};

use crate::archive::{Archive, ArchiveError, ElementKind, OwnerRef, LOCAL_SCHEME};
use crate::naming::NameResolver;
use crate::task::DownloadTask;

const IMAGE_EMBED: &str = "image";

/// All elements sharing one exact source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlGroup {
    pub url: String,
    pub owners: Vec<OwnerRef>,
}

/// Result of walking an archive: remote URLs grouped in first-seen order plus
/// the file names already claimed by local references into the download folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub groups: Vec<UrlGroup>,
    pub reserved_names: BTreeSet<String>,
}

impl Collection {
    fn push(&mut self, index: &mut HashMap<String, usize>, url: &str, owner: OwnerRef) {
        match index.get(url) {
            Some(&slot) => self.groups[slot].owners.push(owner),
            None => {
                index.insert(url.to_string(), self.groups.len());
                self.groups.push(UrlGroup {
                    url: url.to_string(),
                    owners: vec![owner],
                });
            }
        }
    }
}

/// Download tasks with assigned names, plus URLs that could not be named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub tasks: Vec<DownloadTask>,
    pub invalid_urls: Vec<String>,
}

/// Walks channels, messages, attachments and image embeds in a stable order
/// and groups every remote reference by its exact URL.
pub fn collect(archive: &Archive, download_folder_name: &str) -> Result<Collection, ArchiveError> {
    let view = archive.view()?;
    let local_prefix = format!("{LOCAL_SCHEME}./{download_folder_name}/");
    let mut collection = Collection::default();
    let mut index = HashMap::new();

    for (channel_id, messages) in &view.data {
        for (message_id, message) in messages {
            let owner_at = |kind, position| OwnerRef {
                channel_id: channel_id.clone(),
                message_id: message_id.clone(),
                kind,
                index: position,
            };

            let attachments = message.a.iter().flatten().enumerate().map(|(i, attachment)| {
                (owner_at(ElementKind::Attachment, i), attachment.url.as_deref())
            });
            let embeds = message
                .e
                .iter()
                .flatten()
                .enumerate()
                .filter(|(_, embed)| embed.kind.as_deref() == Some(IMAGE_EMBED))
                .map(|(i, embed)| (owner_at(ElementKind::Embed, i), embed.url.as_deref()));

            for (owner, url) in attachments.chain(embeds) {
                let Some(url) = url else {
                    localizer_debug!("skipping {} without url", owner);
                    continue;
                };
                if let Some(local) = url.strip_prefix(LOCAL_SCHEME) {
                    if let Some(name) = url.strip_prefix(&local_prefix) {
                        if !name.is_empty() && !name.contains('/') {
                            collection.reserved_names.insert(name.to_string());
                        }
                    } else {
                        localizer_debug!("{} is local outside the download folder: {}", owner, local);
                    }
                    continue;
                }
                collection.push(&mut index, url, owner);
            }
        }
    }

    Ok(collection)
}

/// Reserves names already in use, then assigns a name to each group in order.
pub fn assign_names(collection: Collection, resolver: &mut NameResolver) -> Plan {
    for name in &collection.reserved_names {
        resolver.reserve(name);
    }

    let mut plan = Plan::default();
    for group in collection.groups {
        match resolver.resolve(&group.url) {
            Ok(file_name) => plan.tasks.push(DownloadTask {
                id: plan.tasks.len(),
                source_url: group.url,
                file_name,
                owners: group.owners,
            }),
            Err(err) => {
                localizer_warn!("Invalid attachment URL: {}", err);
                plan.invalid_urls.push(group.url);
            }
        }
    }
    plan
}
