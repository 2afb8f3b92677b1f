//! Fullscreen passes that follow the scene pass: hue/saturation, depth of
//! field, and the output pass that writes the swapchain.

pub mod depth_of_field;
pub mod output;
pub mod saturation;
pub mod screen_pass;

use crate::error::VitrineError;

/// Slots of the render chain, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassKind {
    /// Backdrop and model into the HDR target.
    Render,
    /// Saturation adjustment.
    HueSaturation,
    /// Bokeh depth of field.
    DepthOfField,
    /// Exposure, tone mapping and encoding to the surface.
    Output,
}

/// Where a pass takes its colour input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassInput {
    /// Nothing upstream: the pass draws the scene itself.
    Scene,
    /// The colour output of an earlier pass.
    Output(PassKind),
}

/// The chain in execution order, each pass with the input it reads.
pub const CHAIN: [(PassKind, PassInput); 4] = [
    (PassKind::Render, PassInput::Scene),
    (PassKind::HueSaturation, PassInput::Output(PassKind::Render)),
    (
        PassKind::DepthOfField,
        PassInput::Output(PassKind::HueSaturation),
    ),
    (PassKind::Output, PassInput::Output(PassKind::DepthOfField)),
];

/// Passes in execution order.
#[must_use]
pub fn pass_order() -> [PassKind; 4] {
    CHAIN.map(|(kind, _)| kind)
}

/// Pick the input of `kind` from the outputs of the passes that ran before
/// it, as listed in `outputs`.
///
/// # Errors
///
/// Returns [`VitrineError::RenderChain`] if `kind` is not a fullscreen
/// pass, or if the pass it reads from is not among `outputs`.
pub fn resolve_input<T: Copy>(
    kind: PassKind,
    outputs: &[(PassKind, T)],
) -> Result<T, VitrineError> {
    let input = CHAIN
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, input)| *input);
    let Some(PassInput::Output(from)) = input else {
        return Err(VitrineError::RenderChain(format!(
            "{kind:?} has no upstream pass"
        )));
    };
    outputs
        .iter()
        .find(|(k, _)| *k == from)
        .map(|(_, output)| *output)
        .ok_or_else(|| {
            VitrineError::RenderChain(format!(
                "{kind:?} reads {from:?}, which has not run yet"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_runs_render_saturation_dof_output() {
        assert_eq!(
            pass_order(),
            [
                PassKind::Render,
                PassKind::HueSaturation,
                PassKind::DepthOfField,
                PassKind::Output,
            ]
        );
    }

    #[test]
    fn each_pass_reads_the_one_before_it() {
        assert_eq!(CHAIN[0].1, PassInput::Scene);
        for pair in CHAIN.windows(2) {
            assert_eq!(pair[1].1, PassInput::Output(pair[0].0));
        }
    }

    #[test]
    fn inputs_resolve_to_upstream_outputs() {
        let outputs = [
            (PassKind::Render, "scene color"),
            (PassKind::HueSaturation, "saturated"),
            (PassKind::DepthOfField, "blurred"),
        ];
        assert_eq!(
            resolve_input(PassKind::HueSaturation, &outputs[..1]).unwrap(),
            "scene color"
        );
        assert_eq!(
            resolve_input(PassKind::DepthOfField, &outputs[..2]).unwrap(),
            "saturated"
        );
        assert_eq!(
            resolve_input(PassKind::Output, &outputs).unwrap(),
            "blurred"
        );
    }

    #[test]
    fn reading_a_later_pass_is_rejected() {
        let outputs = [(PassKind::Render, "scene color")];
        assert!(matches!(
            resolve_input(PassKind::DepthOfField, &outputs),
            Err(VitrineError::RenderChain(_))
        ));
        assert!(resolve_input(PassKind::Render, &outputs).is_err());
    }
}
