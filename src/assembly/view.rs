use crate::{
    metadata::{
        root::Root,
        streams::{Blob, Strings, TablesHeader},
    },
    Error::NotSupported,
    Result,
};

/// Borrowed access to the heaps and tables of one metadata root.
pub(crate) struct MetadataView<'a> {
    strings: Strings<'a>,
    blobs: Option<Blob<'a>>,
    pub(crate) tables: TablesHeader<'a>,
}

impl<'a> MetadataView<'a> {
    /// Parses the metadata root at the start of `metadata` and slices out its streams.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for uncompressed (`#-`) tables and
    /// [`crate::Error::Malformed`] if a required stream is missing or damaged.
    pub(crate) fn new(metadata: &'a [u8]) -> Result<Self> {
        let root = Root::read(metadata)?;

        let tables = match root.stream(metadata, "#~") {
            Some(data) => TablesHeader::from(data)?,
            None if root.stream(metadata, "#-").is_some() => return Err(NotSupported),
            None => return Err(malformed_error!("Metadata has no #~ stream")),
        };

        let strings = match root.stream(metadata, "#Strings") {
            Some(data) => Strings::from(data)?,
            None => return Err(malformed_error!("Metadata has no #Strings stream")),
        };

        let blobs = match root.stream(metadata, "#Blob") {
            Some(data) => Some(Blob::from(data)?),
            None => None,
        };

        Ok(MetadataView {
            strings,
            blobs,
            tables,
        })
    }

    /// The identifier at `index` in `#Strings`.
    pub(crate) fn string(&self, index: u32) -> Result<&'a str> {
        self.strings.get(index as usize)
    }

    /// The blob at `index` in `#Blob`.
    pub(crate) fn blob(&self, index: u32) -> Result<&'a [u8]> {
        match &self.blobs {
            Some(blobs) => blobs.get(index as usize),
            None => Err(malformed_error!(
                "Blob index {} used without a #Blob stream",
                index
            )),
        }
    }
}
