macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

handle!(
    /// Root of a scene graph owned by the collaborator.
    SceneHandle
);
handle!(
    /// Any node of a scene graph. Ray-cast results and event receivers are nodes.
    NodeHandle
);
handle!(CameraHandle);
handle!(
    /// Offscreen color target. Usable as a texture input of a later draw.
    TargetHandle
);
handle!(TextureHandle);
handle!(MaterialHandle);
