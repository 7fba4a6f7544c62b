//! Macros to reduce boilerplate in layer implementations
//!
//! Every concrete layer stores its shared state in a `LayerProperties`
//! field; these macros generate the matching `LayerTrait` accessors.

/// Implements the property-backed `LayerTrait` methods
///
/// Usage:
/// ```ignore
/// impl LayerTrait for MyLayer {
///     impl_layer_trait!(MyLayer, properties);
///     fn options(&self) -> serde_json::Value { ... }
///     fn set_options(&mut self, options: serde_json::Value) -> Result<()> { ... }
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_trait {
    ($layer_type:ty, $properties_field:ident) => {
        fn id(&self) -> &str {
            &self.$properties_field.id
        }

        fn name(&self) -> &str {
            &self.$properties_field.name
        }

        fn layer_type(&self) -> $crate::layers::base::LayerType {
            self.$properties_field.layer_type
        }

        fn z_index(&self) -> i32 {
            self.$properties_field.z_index
        }

        fn set_z_index(&mut self, z_index: i32) {
            self.$properties_field.z_index = z_index;
        }

        fn opacity(&self) -> f32 {
            self.$properties_field.opacity
        }

        fn set_opacity(&mut self, opacity: f32) {
            self.$properties_field.opacity = opacity.clamp(0.0, 1.0);
        }

        fn is_visible(&self) -> bool {
            self.$properties_field.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.$properties_field.visible = visible;
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

/// Implements `set_options` for layers whose options are derived from their
/// own fields; only the `opacity` and `visible` keys are honoured
#[macro_export]
macro_rules! impl_basic_options_setter {
    () => {
        fn set_options(&mut self, options: serde_json::Value) -> $crate::Result<()> {
            if let Some(opacity) = options.get("opacity").and_then(|v| v.as_f64()) {
                $crate::layers::base::LayerTrait::set_opacity(self, opacity as f32);
            }
            if let Some(visible) = options.get("visible").and_then(|v| v.as_bool()) {
                $crate::layers::base::LayerTrait::set_visible(self, visible);
            }
            Ok(())
        }
    };
}
