/// Model being saved, tagged with whether backend already knows it
#[derive(Clone, Debug, PartialEq)]
pub enum Draft<M> {
    /// Not yet created, save routes to create
    New(M),
    /// Has backend-assigned identity, save routes to update
    Existing(M),
}

impl<M> Draft<M> {
    pub fn model(&self) -> &M {
        match self {
            Self::New(m) | Self::Existing(m) => m,
        }
    }

    pub fn into_model(self) -> M {
        match self {
            Self::New(m) | Self::Existing(m) => m,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }
}
