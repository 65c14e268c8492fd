//! Per-skeleton orchestration: binding, masks, the per-frame solve pass,
//! calibration and hand mirroring.

use super::chain::{BodyChain, ChainId, ChainPositions, SkeletalChain};
use super::config::IkConfig;
use super::hint::HintEstimator;
use super::snapshot::PoseSnapshot;
use super::solver::{unit_weight, IkSolver, SolverWeights};
use super::target::IkTarget;
use crate::math::{Transform, Vec3};
use crate::skeleton::{Side, SkeletonProvider};

/// Integer masks the manager keeps. Bit *i* of a mask toggles the *i*-th
/// chain of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskGroup {
    /// [`BodyChain`] bits.
    Body,
    /// [`Finger`](crate::skeleton::Finger) bits of the left hand.
    LeftFingers,
    /// [`Finger`](crate::skeleton::Finger) bits of the right hand.
    RightFingers,
    /// [`BodyChain`] bits selecting which limbs estimate their own hint.
    AutoHint,
}

impl MaskGroup {
    pub fn fingers(side: Side) -> Self {
        match side {
            Side::Left => MaskGroup::LeftFingers,
            Side::Right => MaskGroup::RightFingers,
        }
    }

    /// Mask with every valid bit of the group set.
    pub fn full(self) -> u32 {
        match self {
            MaskGroup::Body | MaskGroup::AutoHint => (1 << BodyChain::ALL.len()) - 1,
            MaskGroup::LeftFingers | MaskGroup::RightFingers => 0b1_1111,
        }
    }

    fn of(id: ChainId) -> Self {
        match id {
            ChainId::Body(_) => MaskGroup::Body,
            ChainId::Finger(side, _) => MaskGroup::fingers(side),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub const DEFAULT_AUTO_HINT_MASK: u32 = (1 << BodyChain::LeftHand as u32)
    | (1 << BodyChain::RightHand as u32)
    | (1 << BodyChain::LeftFoot as u32)
    | (1 << BodyChain::RightFoot as u32);

#[derive(Debug, Clone)]
struct ChainSlot {
    chain: SkeletalChain,
    target: IkTarget,
    snapshot: PoseSnapshot,
    /// Last auto-hint estimate, in the target's frame. Kept apart from
    /// `target.hint` so producer hints survive auto-hinting.
    estimated_hint: Option<Vec3>,
    position_weight: f32,
    rotation_weight: f32,
}

/// Owns every chain, target and snapshot for one skeleton.
///
/// All operations take the skeleton by reference and must be called from
/// the same frame tick: trackers write targets, then
/// [`update_tracking`](IkManager::update_tracking) runs, then consumers read
/// the pose.
#[derive(Debug, Clone)]
pub struct IkManager {
    config: IkConfig,
    solver: Box<dyn IkSolver>,
    hints: HintEstimator,
    slots: [Option<ChainSlot>; ChainId::COUNT],
    masks: [u32; 4],
}

impl Default for IkManager {
    fn default() -> Self {
        Self::new(IkConfig::default())
    }
}

impl IkManager {
    pub fn new(config: IkConfig) -> Self {
        Self {
            solver: config.build_solver(),
            hints: config.hint_estimator(),
            config,
            slots: std::array::from_fn(|_| None),
            masks: [
                MaskGroup::Body.full(),
                MaskGroup::LeftFingers.full(),
                MaskGroup::RightFingers.full(),
                DEFAULT_AUTO_HINT_MASK,
            ],
        }
    }

    pub fn config(&self) -> &IkConfig {
        &self.config
    }

    pub fn solver(&self) -> &dyn IkSolver {
        self.solver.as_ref()
    }

    /// Creates the chain, target and snapshot of every chain the skeleton
    /// can carry and that is not bound yet. Bones the skeleton lacks are
    /// skipped. Returns how many chains were newly bound.
    pub fn bind(&mut self, skeleton: &dyn SkeletonProvider) -> usize {
        let root = skeleton.root();
        let mut bound = 0;

        for id in ChainId::all() {
            if self.slots[id.index()].is_some() {
                continue;
            }

            let Some(chain) = SkeletalChain::resolve(skeleton, id.def()) else {
                log::debug!("{id}: bones missing, chain not created");
                continue;
            };
            let Some(limb_world) = skeleton.world(chain.limb) else {
                continue;
            };
            let frame = self.target_frame(id, &root);
            let target_pose = frame.inverse().mul_transform(&limb_world);
            let Some(snapshot) = PoseSnapshot::capture(skeleton, &chain, target_pose) else {
                continue;
            };

            self.slots[id.index()] = Some(ChainSlot {
                chain,
                target: IkTarget::new(target_pose),
                snapshot,
                estimated_hint: None,
                position_weight: 1.0,
                rotation_weight: 1.0,
            });
            bound += 1;
        }

        log::debug!("bound {bound} chains ({} total)", self.bound_count());
        bound
    }

    pub fn is_bound(&self, id: ChainId) -> bool {
        self.slots[id.index()].is_some()
    }

    pub fn bound_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn bound_chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        ChainId::all().filter(|id| self.is_bound(*id))
    }

    pub fn set_mask(&mut self, group: MaskGroup, bits: u32) {
        self.masks[group.index()] = bits & group.full();
    }

    pub fn mask(&self, group: MaskGroup) -> u32 {
        self.masks[group.index()]
    }

    pub fn set_enabled(&mut self, id: ChainId, enabled: bool) {
        let group = MaskGroup::of(id);
        let bits = self.mask(group);
        let bits = if enabled { bits | id.bit() } else { bits & !id.bit() };
        self.set_mask(group, bits);
    }

    pub fn is_enabled(&self, id: ChainId) -> bool {
        self.mask(MaskGroup::of(id)) & id.bit() != 0
    }

    pub fn auto_hint(&self, id: ChainId) -> bool {
        match id {
            ChainId::Body(body) => self.mask(MaskGroup::AutoHint) & body.bit() != 0,
            ChainId::Finger(..) => false,
        }
    }

    pub fn set_weights(&mut self, id: ChainId, position: f32, rotation: f32) {
        if let Some(slot) = self.slots[id.index()].as_mut() {
            slot.position_weight = unit_weight(position);
            slot.rotation_weight = unit_weight(rotation);
        }
    }

    pub fn weights(&self, id: ChainId) -> Option<SolverWeights> {
        let slot = self.slots[id.index()].as_ref()?;
        Some(SolverWeights {
            position: slot.position_weight,
            rotation: slot.rotation_weight,
            enabled: self.is_enabled(id),
        })
    }

    pub fn chain(&self, id: ChainId) -> Option<&SkeletalChain> {
        self.slots[id.index()].as_ref().map(|s| &s.chain)
    }

    pub fn target(&self, id: ChainId) -> Option<&IkTarget> {
        self.slots[id.index()].as_ref().map(|s| &s.target)
    }

    pub fn target_mut(&mut self, id: ChainId) -> Option<&mut IkTarget> {
        self.slots[id.index()].as_mut().map(|s| &mut s.target)
    }

    /// Frame `id`'s target pose is stored in: the hand target's world pose
    /// for fingers whose hand is bound, the character root otherwise.
    pub fn target_frame(&self, id: ChainId, root: &Transform) -> Transform {
        match id {
            ChainId::Finger(side, _) => self
                .target(ChainId::Body(BodyChain::hand(side)))
                .map_or(*root, |hand| hand.world_pose(root)),
            ChainId::Body(_) => *root,
        }
    }

    /// The hint the estimator produced for `id` on the last pass, in the
    /// target's frame. `None` once auto-hinting is off for the chain.
    pub fn estimated_hint(&self, id: ChainId) -> Option<Vec3> {
        if !self.auto_hint(id) {
            return None;
        }
        self.slots[id.index()].as_ref()?.estimated_hint
    }

    pub fn snapshot(&self, id: ChainId) -> Option<&PoseSnapshot> {
        self.slots[id.index()].as_ref().map(|s| &s.snapshot)
    }

    pub fn chain_positions(
        &self,
        id: ChainId,
        skeleton: &dyn SkeletonProvider,
    ) -> Option<ChainPositions> {
        self.chain(id)?.positions(skeleton)
    }

    /// Runs one solve pass over every enabled chain in solve order.
    ///
    /// Limbs with their auto-hint bit set get a fresh hint estimate, used in
    /// place of the producer's hint. Chains whose goal is not finite are
    /// skipped for this frame only.
    pub fn update_tracking(&mut self, skeleton: &mut dyn SkeletonProvider) {
        let root = skeleton.root();

        for id in ChainId::all() {
            if !self.is_enabled(id) {
                continue;
            }
            let auto_hint = self.auto_hint(id);
            let frame = self.target_frame(id, &root);
            let Some(slot) = self.slots[id.index()].as_mut() else {
                continue;
            };

            let mut goal = slot.target.goal(&frame);
            if !goal.is_valid() {
                log::trace!("{id}: target is not finite, skipped this frame");
                continue;
            }
            if let Some(kind) = id.hint_kind().filter(|_| auto_hint) {
                if let Some(positions) = slot.chain.positions(&*skeleton) {
                    let previous = slot.estimated_hint.map(|h| frame.transform_point(h));
                    let hint = self.hints.estimate(
                        kind,
                        &positions,
                        goal.position,
                        goal.rotation,
                        &root,
                        previous,
                    );
                    slot.estimated_hint = Some(frame.inverse_transform_point(hint));
                    goal.hint = Some(hint);
                }
            }

            let weights = SolverWeights {
                position: slot.position_weight,
                rotation: slot.rotation_weight,
                enabled: true,
            };
            self.solver
                .solve(skeleton, &slot.chain, &goal, weights, &slot.snapshot);
        }
    }

    /// Puts every bound chain back into its snapshot pose.
    pub fn reset_pose(&self, skeleton: &mut dyn SkeletonProvider) {
        for slot in self.slots.iter().flatten() {
            slot.snapshot.apply(skeleton, &slot.chain);
        }
    }

    /// Restores every target to its bind-time pose and re-records the joint
    /// rotations from the skeleton's current pose.
    pub fn calibrate(&mut self, skeleton: &dyn SkeletonProvider) {
        for slot in self.slots.iter_mut().flatten() {
            slot.target.pose = slot.snapshot.target;
            slot.estimated_hint = None;
            slot.snapshot.recapture_joints(skeleton, &slot.chain);
        }
        log::debug!("calibrated {} chains", self.bound_count());
    }

    /// Copies the hand and finger target poses of `source` onto the other
    /// hand, reflected across the character's YZ plane. Nothing is solved.
    ///
    /// Finger poses are relative to their hand target and reflection
    /// commutes with composition, so each stored pose mirrors on its own.
    pub fn mirror_pose(&mut self, source: Side, destination: Side) {
        if source == destination {
            return;
        }
        for (src, dst) in ChainId::hand_group(source)
            .into_iter()
            .zip(ChainId::hand_group(destination))
        {
            let Some(pose) = self.target(src).map(|t| t.pose) else {
                continue;
            };
            if let Some(target) = self.target_mut(dst) {
                target.pose = pose.mirrored_x();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{humanoid_t_pose, Finger, HumanBone, Phalanx, Skeleton};
    use glam::Quat;

    const LEFT_HAND: ChainId = ChainId::Body(BodyChain::LeftHand);
    const RIGHT_HAND: ChainId = ChainId::Body(BodyChain::RightHand);

    fn bound() -> (IkManager, Skeleton) {
        let skeleton = humanoid_t_pose(Transform::IDENTITY).unwrap();
        let mut manager = IkManager::default();
        assert_eq!(manager.bind(&skeleton), ChainId::COUNT);
        (manager, skeleton)
    }

    #[test]
    fn bind_is_idempotent() {
        let (mut manager, skeleton) = bound();
        let chain = *manager.chain(LEFT_HAND).unwrap();
        assert_eq!(manager.bind(&skeleton), 0);
        assert_eq!(manager.chain(LEFT_HAND), Some(&chain));
        assert_eq!(manager.bound_count(), ChainId::COUNT);
    }

    #[test]
    fn bind_skips_missing_bones() {
        let mut skeleton = Skeleton::default();
        let upper = skeleton
            .add_bone(HumanBone::RightUpperArm, None, Transform::IDENTITY)
            .unwrap();
        let mid = skeleton
            .add_bone(
                HumanBone::RightLowerArm,
                Some(upper),
                Transform::from_position(Vec3::X * 0.3),
            )
            .unwrap();
        skeleton
            .add_bone(
                HumanBone::RightHand,
                Some(mid),
                Transform::from_position(Vec3::X * 0.3),
            )
            .unwrap();

        let mut manager = IkManager::default();
        assert_eq!(manager.bind(&skeleton), 1);
        assert_eq!(manager.bound_chains().collect::<Vec<_>>(), vec![RIGHT_HAND]);
        assert!(manager.target(LEFT_HAND).is_none());
    }

    #[test]
    fn targets_start_at_the_limb() {
        let (manager, skeleton) = bound();
        let hand = skeleton.bone(HumanBone::LeftHand).unwrap();
        let target = manager.target(LEFT_HAND).unwrap();
        assert!(target
            .pose
            .position
            .abs_diff_eq(skeleton.position(hand).unwrap(), 1e-6));
        assert_eq!(target.hint, None);
    }

    #[test]
    fn masks_toggle_chains_without_unbinding() {
        let (mut manager, _) = bound();
        manager.set_mask(MaskGroup::Body, !LEFT_HAND.bit());
        assert!(!manager.is_enabled(LEFT_HAND));
        assert!(manager.is_enabled(RIGHT_HAND));
        assert!(manager.is_bound(LEFT_HAND));
        assert_eq!(manager.mask(MaskGroup::Body), MaskGroup::Body.full() & !0b100);

        let thumb = ChainId::Finger(Side::Right, Finger::Thumb);
        manager.set_enabled(thumb, false);
        assert_eq!(manager.mask(MaskGroup::RightFingers), 0b1_1110);
        assert!(!manager.weights(thumb).unwrap().enabled);
        manager.set_enabled(thumb, true);
        assert!(manager.is_enabled(thumb));
    }

    #[test]
    fn weights_are_clamped() {
        let (mut manager, _) = bound();
        manager.set_weights(RIGHT_HAND, 1.5, -0.2);
        let weights = manager.weights(RIGHT_HAND).unwrap();
        assert_eq!(weights.position, 1.0);
        assert_eq!(weights.rotation, 0.0);
    }

    #[test]
    fn nan_weights_fall_back_to_the_animated_pose() {
        let (mut manager, mut skeleton) = bound();
        manager.set_weights(RIGHT_HAND, f32::NAN, f32::NAN);
        let weights = manager.weights(RIGHT_HAND).unwrap();
        assert_eq!((weights.position, weights.rotation), (0.0, 0.0));

        manager
            .target_mut(RIGHT_HAND)
            .unwrap()
            .set_world_pose(&Transform::IDENTITY, Vec3::new(0.3, 1.2, -0.3), Quat::IDENTITY);
        manager.update_tracking(&mut skeleton);

        let chain = manager.chain(RIGHT_HAND).unwrap();
        let rotations = chain.local_rotations(&skeleton).unwrap();
        assert_eq!(rotations, manager.snapshot(RIGHT_HAND).unwrap().rotations);
    }

    #[test]
    fn disabled_limb_stays_at_snapshot() {
        let (mut manager, mut skeleton) = bound();
        manager.set_enabled(LEFT_HAND, false);
        manager
            .target_mut(LEFT_HAND)
            .unwrap()
            .set_world_pose(&Transform::IDENTITY, Vec3::new(-0.3, 1.1, -0.3), Quat::IDENTITY);

        manager.update_tracking(&mut skeleton);

        let chain = manager.chain(LEFT_HAND).unwrap();
        let snapshot = manager.snapshot(LEFT_HAND).unwrap();
        assert_eq!(chain.local_rotations(&skeleton).unwrap(), snapshot.rotations);
    }

    #[test]
    fn auto_hint_estimates_beside_the_producer_hint() {
        let (mut manager, mut skeleton) = bound();
        let elbow = skeleton.bone(HumanBone::LeftLowerArm).unwrap();
        let elbow = skeleton.position(elbow).unwrap();
        let producer = Vec3::new(-0.4, 1.0, 0.5);
        manager.target_mut(LEFT_HAND).unwrap().hint = Some(producer);

        manager.update_tracking(&mut skeleton);

        let hint = manager.estimated_hint(LEFT_HAND).unwrap();
        let distance = (hint - elbow).length();
        assert!((distance - manager.config().hint_distance).abs() < 1e-5);
        assert_eq!(manager.target(LEFT_HAND).unwrap().hint, Some(producer));
        assert_eq!(manager.estimated_hint(ChainId::Body(BodyChain::Head)), None);
    }

    #[test]
    fn clearing_auto_hint_drops_the_estimate() {
        let (mut manager, mut skeleton) = bound();
        let shoulder = skeleton.bone(HumanBone::RightUpperArm).unwrap();
        let goal = skeleton.position(shoulder).unwrap() + Vec3::new(0.2, -0.3, -0.25);
        manager
            .target_mut(RIGHT_HAND)
            .unwrap()
            .set_world_pose(&Transform::IDENTITY, goal, Quat::IDENTITY);
        let hand = skeleton.bone(HumanBone::RightHand).unwrap();

        manager.update_tracking(&mut skeleton);
        assert!(skeleton.position(hand).unwrap().abs_diff_eq(goal, 1e-3));

        manager.set_mask(MaskGroup::AutoHint, 0);
        assert_eq!(manager.estimated_hint(RIGHT_HAND), None);
        manager.reset_pose(&mut skeleton);
        manager.update_tracking(&mut skeleton);

        // No hint left, so no bend: the straight arm only points at the goal.
        let reached = skeleton.position(hand).unwrap();
        assert!(reached.distance(goal) > 0.1, "{reached:?}");
        assert_eq!(manager.target(RIGHT_HAND).unwrap().hint, None);
    }

    #[test]
    fn invalid_target_skips_only_that_chain() {
        let (mut manager, mut skeleton) = bound();
        let before = manager
            .chain(LEFT_HAND)
            .unwrap()
            .local_rotations(&skeleton)
            .unwrap();
        manager.target_mut(LEFT_HAND).unwrap().pose.position = Vec3::NAN;
        let reach = Vec3::new(0.3, 1.2, -0.3);
        manager
            .target_mut(RIGHT_HAND)
            .unwrap()
            .set_world_pose(&Transform::IDENTITY, reach, Quat::IDENTITY);

        manager.update_tracking(&mut skeleton);

        let left = manager.chain(LEFT_HAND).unwrap();
        assert_eq!(left.local_rotations(&skeleton).unwrap(), before);
        let right = manager.chain_positions(RIGHT_HAND, &skeleton).unwrap();
        assert!(right.limb.abs_diff_eq(reach, 1e-3), "{:?}", right.limb);
    }

    #[test]
    fn finger_targets_follow_their_hand() {
        let (mut manager, mut skeleton) = bound();
        let hand = skeleton.bone(HumanBone::RightHand).unwrap();
        let tip = skeleton
            .bone(HumanBone::Finger(Side::Right, Finger::Index, Phalanx::Distal))
            .unwrap();
        let bind_hand = skeleton.world(hand).unwrap();
        let bind_tip = bind_hand.inverse_transform_point(skeleton.position(tip).unwrap());

        let shoulder = skeleton.bone(HumanBone::RightUpperArm).unwrap();
        let goal = skeleton.position(shoulder).unwrap() + Vec3::new(0.2, -0.3, -0.25);
        manager.target_mut(RIGHT_HAND).unwrap().set_world_pose(
            &Transform::IDENTITY,
            goal,
            Quat::from_rotation_z(-0.4),
        );

        manager.update_tracking(&mut skeleton);

        let hand_world = skeleton.world(hand).unwrap();
        let tip_in_hand = hand_world.inverse_transform_point(skeleton.position(tip).unwrap());
        assert!(tip_in_hand.abs_diff_eq(bind_tip, 1e-4), "{tip_in_hand:?}");

        for id in ChainId::hand_group(Side::Right).into_iter().skip(1) {
            let chain = manager.chain(id).unwrap();
            let rotations = chain.local_rotations(&skeleton).unwrap();
            let snapshot = manager.snapshot(id).unwrap().rotations;
            assert!(rotations.upper.abs_diff_eq(snapshot.upper, 1e-3), "{id}");
            assert!(rotations.mid.abs_diff_eq(snapshot.mid, 1e-3), "{id}");
        }

        let index = ChainId::Finger(Side::Right, Finger::Index);
        let frame = manager.target_frame(index, &Transform::IDENTITY);
        assert!(frame.position.abs_diff_eq(goal, 1e-6));
    }

    #[test]
    fn mirror_round_trip_restores_source() {
        let (mut manager, _) = bound();
        let pose = Transform::new(
            Vec3::new(-0.25, 1.3, -0.4),
            Quat::from_euler(glam::EulerRot::YXZ, 0.4, -0.2, 0.9),
        );
        manager.target_mut(LEFT_HAND).unwrap().pose = pose;
        let index = ChainId::Finger(Side::Left, Finger::Index);
        let finger_pose = manager.target(index).unwrap().pose;

        manager.mirror_pose(Side::Left, Side::Right);
        let mirrored = manager.target(RIGHT_HAND).unwrap().pose;
        assert_eq!(mirrored.position, Vec3::new(0.25, 1.3, -0.4));
        assert_eq!(mirrored.rotation.x, pose.rotation.x);
        assert_eq!(mirrored.rotation.y, -pose.rotation.y);

        manager.mirror_pose(Side::Right, Side::Left);
        assert_eq!(manager.target(LEFT_HAND).unwrap().pose, pose);
        assert_eq!(manager.target(index).unwrap().pose, finger_pose);
    }

    #[test]
    fn calibrate_restores_targets_and_rebaselines_joints() {
        let (mut manager, mut skeleton) = bound();
        let bind_target = manager.snapshot(RIGHT_HAND).unwrap().target;
        manager.target_mut(RIGHT_HAND).unwrap().pose.position += Vec3::Y;

        let upper = manager.chain(RIGHT_HAND).unwrap().upper;
        skeleton.set_local_rotation(upper, Quat::from_rotation_z(-1.0));
        manager.calibrate(&skeleton);

        assert_eq!(manager.target(RIGHT_HAND).unwrap().pose, bind_target);
        assert_eq!(
            manager.snapshot(RIGHT_HAND).unwrap().rotations.upper,
            Quat::from_rotation_z(-1.0)
        );
    }

    #[test]
    fn reset_pose_returns_to_snapshot() {
        let (mut manager, mut skeleton) = bound();
        manager
            .target_mut(RIGHT_HAND)
            .unwrap()
            .set_world_pose(&Transform::IDENTITY, Vec3::new(0.2, 1.0, -0.3), Quat::IDENTITY);
        manager.update_tracking(&mut skeleton);
        manager.reset_pose(&mut skeleton);

        let chain = manager.chain(RIGHT_HAND).unwrap();
        assert_eq!(
            chain.local_rotations(&skeleton).unwrap(),
            manager.snapshot(RIGHT_HAND).unwrap().rotations
        );
    }
}
