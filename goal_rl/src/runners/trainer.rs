//! Threaded off-policy training loop.
//!
//! Three kinds of threads cooperate around lock-free shared state:
//!
//! ```text
//! collector threads (xN)          learner thread            main thread
//! ─────────────────────          ──────────────            ───────────
//! run envs, push episodes  ───►  HerReplayBuffer           monitor loop:
//! poll PolicySlot          ◄───  publish weights           drain episode
//! send FinishedEpisode     ───────────────────────────►    reports, stats,
//!                                                          termination
//! ```
//!
//! Collectors run the inference copy of the policy on the inner backend;
//! only the learner touches autodiff. The learner paces itself against the
//! global environment step count (update-to-data ratio) so gradient steps
//! neither starve nor outrun collection.

use burn::module::AutodiffModule;
use burn::grad_clipping::GradientClippingConfig;
use burn::optim::{AdamConfig, Optimizer};
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{Distribution, Tensor};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::{TrainerConfig, TrainerStats};
use crate::algorithms::{
    Exploration, GoalActor, GoalActorTraining, GoalCriticTraining, LossInfo, Optimizers,
    UpdateModels, UpdateRule,
};
use crate::checkpoint::Checkpointer;
use crate::core::{
    policy_slot_with, EpisodeOutcome, EpisodeTracker, FinishedEpisode, SharedPolicySlot,
};
use crate::environment::{GoalEnv, GoalRewardFn};
use crate::replay::{GoalEpisode, GoalTransition, HerReplayBuffer};

/// Trained networks plus the final statistics snapshot.
pub struct TrainOutcome<A, C> {
    pub actor: A,
    pub critic: C,
    pub stats: TrainerStats,
}

/// Off-policy trainer for goal-conditioned environments.
///
/// Generic over the algorithm through [`UpdateRule`]; one trainer serves
/// DDPG, TD3, and SAC.
pub struct OffPolicyTrainer<B: AutodiffBackend> {
    config: TrainerConfig,
    _phantom: PhantomData<B>,
}

impl<B: AutodiffBackend> OffPolicyTrainer<B> {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Create Adam optimizers for the actor and critic, with gradient
    /// clipping when configured.
    pub fn create_optimizers<Actor, Critic>(
        &self,
    ) -> (impl Optimizer<Actor, B>, impl Optimizer<Critic, B>)
    where
        Actor: AutodiffModule<B>,
        Critic: AutodiffModule<B>,
    {
        let mut actor_config = AdamConfig::new().with_epsilon(1e-5);
        let mut critic_config = AdamConfig::new().with_epsilon(1e-5);

        if let Some(max_norm) = self.config.max_grad_norm {
            actor_config =
                actor_config.with_grad_clipping(Some(GradientClippingConfig::Norm(max_norm)));
            critic_config =
                critic_config.with_grad_clipping(Some(GradientClippingConfig::Norm(max_norm)));
        }

        (actor_config.init(), critic_config.init())
    }

    /// Run training until a termination condition fires.
    ///
    /// # Arguments
    ///
    /// - `rule`: the algorithm (owns its hyperparameters and schedules)
    /// - `actor_factory`: builds a fresh actor on a device; collectors use it
    ///   to materialize published weights
    /// - `initial_actor` / `initial_critic`: starting networks
    /// - `env_factory`: builds an environment for `(actor_id, n_envs)`
    /// - `callback`: invoked with [`TrainerStats`] on the log interval
    #[allow(clippy::too_many_arguments)]
    pub fn run<A, C, R, AF, EF, E, OA, OC, F>(
        &self,
        rule: R,
        actor_factory: AF,
        initial_actor: A,
        initial_critic: C,
        env_factory: EF,
        actor_optimizer: OA,
        critic_optimizer: OC,
        callback: F,
    ) -> TrainOutcome<A, C>
    where
        A: GoalActorTraining<B> + 'static,
        A::InnerModule: GoalActor<B::InnerBackend>,
        A::Record: Send + 'static,
        C: GoalCriticTraining<B> + 'static,
        R: UpdateRule<B, A, C>,
        AF: Fn(&B::Device) -> A + Send + Sync + Clone + 'static,
        EF: Fn(usize, usize) -> E + Send + Sync + Clone + 'static,
        E: GoalEnv + 'static,
        OA: Optimizer<A, B> + 'static,
        OC: Optimizer<C, B> + 'static,
        F: Fn(&TrainerStats),
    {
        let device = B::Device::default();
        let config = self.config.clone();
        let exploration = rule.exploration();
        let algorithm = rule.name();

        println!("=== {} Trainer ===", algorithm);
        println!(
            "Collectors: {} x {} envs = {} total",
            config.n_actors,
            config.n_envs_per_actor,
            config.total_envs()
        );
        println!(
            "Buffer capacity: {}, min size: {}, batch: {}",
            config.buffer.capacity, config.buffer.min_size, config.buffer.batch_size
        );
        println!(
            "HER: {} ({:?} strategy, {} virtual goals)",
            config.buffer.her, config.buffer.strategy, config.buffer.n_sampled_goal
        );

        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();

        // Factory round trip catches record/shape mismatches before any
        // thread is spawned.
        {
            let template = actor_factory(&device);
            let _ = template.load_record(initial_actor.clone().into_record());
        }

        // Probe one environment for shape agreement and the reward handle.
        let reward_fn: GoalRewardFn = {
            let probe = env_factory(0, 1);
            let input_size = probe.obs_size() + probe.goal_size();
            assert_eq!(
                initial_actor.input_size(),
                input_size,
                "actor input size {} does not match obs+goal size {}",
                initial_actor.input_size(),
                input_size
            );
            assert_eq!(
                initial_actor.action_dim(),
                probe.action_dim(),
                "actor action dim does not match environment"
            );
            assert_eq!(
                initial_critic.input_size(),
                input_size,
                "critic input size does not match obs+goal size"
            );
            assert_eq!(
                initial_critic.action_dim(),
                probe.action_dim(),
                "critic action dim does not match environment"
            );
            if exploration == Exploration::PolicySample {
                assert!(
                    initial_actor.is_stochastic(),
                    "{} requires a stochastic actor (log-std head)",
                    algorithm
                );
            }
            probe.reward_handle()
        };

        let initial_bytes = recorder
            .record(initial_actor.clone().into_record(), ())
            .expect("Failed to serialize initial policy");
        println!("Initial policy serialized: {} bytes", initial_bytes.len());

        // Shared state.
        let policy_slot: SharedPolicySlot = policy_slot_with(initial_bytes);
        let buffer = Arc::new(HerReplayBuffer::new(config.buffer.clone()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let total_env_steps = Arc::new(AtomicUsize::new(0));
        let train_steps = Arc::new(AtomicUsize::new(0));
        let shared_loss: Arc<Mutex<LossInfo>> = Arc::new(Mutex::new(LossInfo::default()));
        let success_bits = Arc::new(AtomicU32::new(0f32.to_bits()));
        let (episode_tx, episode_rx) = crossbeam_channel::unbounded::<FinishedEpisode>();

        // Target networks start as copies of the online ones.
        let target_actor = initial_actor.clone();
        let target_critic = initial_critic.clone();

        let checkpointer = config.checkpoint.as_ref().map(|ckpt| {
            Checkpointer::new(ckpt.clone()).expect("Failed to create checkpoint directory")
        });

        // Collector threads.
        let mut collector_handles = Vec::with_capacity(config.n_actors);
        for actor_id in 0..config.n_actors {
            let actor_factory = actor_factory.clone();
            let env_factory = env_factory.clone();
            let buffer = Arc::clone(&buffer);
            let slot = Arc::clone(&policy_slot);
            let shutdown_flag = Arc::clone(&shutdown);
            let env_steps = Arc::clone(&total_env_steps);
            let episode_tx = episode_tx.clone();
            let cfg = config.clone();

            let handle = std::thread::Builder::new()
                .name(format!("{}-collector-{}", algorithm, actor_id))
                .spawn(move || {
                    Self::collector_thread::<A, AF, EF, E>(
                        actor_id,
                        &cfg,
                        exploration,
                        actor_factory,
                        env_factory,
                        slot,
                        buffer,
                        shutdown_flag,
                        env_steps,
                        episode_tx,
                    );
                })
                .expect("Failed to spawn collector thread");

            collector_handles.push(handle);
        }
        drop(episode_tx);

        // Learner thread.
        let learner_slot = Arc::clone(&policy_slot);
        let learner_buffer = Arc::clone(&buffer);
        let learner_shutdown = Arc::clone(&shutdown);
        let learner_train_steps = Arc::clone(&train_steps);
        let learner_env_steps = Arc::clone(&total_env_steps);
        let learner_loss = Arc::clone(&shared_loss);
        let learner_success = Arc::clone(&success_bits);
        let cfg = config.clone();

        let learner_handle = std::thread::Builder::new()
            .name(format!("{}-learner", algorithm))
            .spawn(move || {
                Self::learner_thread::<A, C, R, OA, OC>(
                    &cfg,
                    rule,
                    UpdateModels {
                        actor: initial_actor,
                        critic: initial_critic,
                        target_actor,
                        target_critic,
                    },
                    Optimizers {
                        actor: actor_optimizer,
                        critic: critic_optimizer,
                    },
                    reward_fn,
                    checkpointer,
                    learner_success,
                    learner_slot,
                    learner_buffer,
                    learner_shutdown,
                    learner_train_steps,
                    learner_env_steps,
                    learner_loss,
                )
            })
            .expect("Failed to spawn learner thread");

        // Monitor loop on the calling thread.
        let start_time = Instant::now();
        let mut last_log = Instant::now();
        let mut stats = TrainerStats::default();
        let mut recent: VecDeque<FinishedEpisode> =
            VecDeque::with_capacity(config.success_window);
        let mut episodes = 0usize;

        while !shutdown.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_millis(100));

            while let Ok(finished) = episode_rx.try_recv() {
                episodes += 1;
                if recent.len() >= config.success_window {
                    recent.pop_front();
                }
                recent.push_back(finished);
            }

            let env_steps = total_env_steps.load(Ordering::Relaxed);

            stats.env_steps = env_steps;
            stats.train_steps = train_steps.load(Ordering::Relaxed);
            stats.episodes = episodes;
            if !recent.is_empty() {
                let n = recent.len() as f32;
                stats.mean_return = recent.iter().map(|e| e.total_reward).sum::<f32>() / n;
                stats.success_rate =
                    recent.iter().filter(|e| e.success).count() as f32 / n;
                stats.mean_episode_length =
                    recent.iter().map(|e| e.length as f32).sum::<f32>() / n;
            }
            {
                let loss = shared_loss.lock();
                stats.critic_loss = loss.critic_loss;
                stats.actor_loss = loss.actor_loss;
                stats.alpha_loss = loss.alpha_loss;
                stats.alpha = loss.alpha;
                stats.mean_q = loss.mean_q;
            }
            stats.buffer_utilization = buffer.utilization();
            stats.sps = env_steps as f32 / start_time.elapsed().as_secs_f32();
            stats.elapsed_secs = start_time.elapsed().as_secs_f32();
            success_bits.store(stats.success_rate.to_bits(), Ordering::Relaxed);

            if env_steps >= config.max_env_steps {
                println!("\nReached max env steps: {}", config.max_env_steps);
                shutdown.store(true, Ordering::Relaxed);
                break;
            }

            if let Some(target) = config.target_success_rate {
                if recent.len() >= config.success_window && stats.success_rate >= target {
                    println!(
                        "\n=== Solved: success rate {:.1}% >= {:.1}% ===",
                        stats.success_rate * 100.0,
                        target * 100.0
                    );
                    shutdown.store(true, Ordering::Relaxed);
                    break;
                }
            }

            if last_log.elapsed().as_secs_f32() >= config.log_interval_secs {
                callback(&stats);
                last_log = Instant::now();
            }
        }

        shutdown.store(true, Ordering::Relaxed);

        for handle in collector_handles {
            let _ = handle.join();
        }

        let (actor, critic) = learner_handle.join().expect("Learner thread panicked");

        // Late episode reports from the shutdown window.
        while let Ok(finished) = episode_rx.try_recv() {
            episodes += 1;
            if recent.len() >= config.success_window {
                recent.pop_front();
            }
            recent.push_back(finished);
        }
        stats.episodes = episodes;
        stats.env_steps = total_env_steps.load(Ordering::Relaxed);
        stats.train_steps = train_steps.load(Ordering::Relaxed);

        println!("\n=== Training Complete ===");
        println!("Duration: {:.1}s", start_time.elapsed().as_secs_f32());
        println!(
            "Env steps: {}, episodes: {}, train steps: {}",
            stats.env_steps, stats.episodes, stats.train_steps
        );
        println!("Final success rate: {:.1}%", stats.success_rate * 100.0);

        TrainOutcome {
            actor,
            critic,
            stats,
        }
    }

    /// Collector thread: runs environments with the latest published policy
    /// and pushes finished episodes to the replay buffer.
    #[allow(clippy::too_many_arguments)]
    fn collector_thread<A, AF, EF, E>(
        actor_id: usize,
        config: &TrainerConfig,
        exploration: Exploration,
        actor_factory: AF,
        env_factory: EF,
        slot: SharedPolicySlot,
        buffer: Arc<HerReplayBuffer>,
        shutdown: Arc<AtomicBool>,
        env_steps: Arc<AtomicUsize>,
        episode_tx: Sender<FinishedEpisode>,
    ) where
        A: GoalActorTraining<B>,
        A::InnerModule: GoalActor<B::InnerBackend>,
        A::Record: Send + 'static,
        AF: Fn(&B::Device) -> A,
        EF: Fn(usize, usize) -> E,
        E: GoalEnv,
    {
        let device = B::Device::default();
        let inner_device = <B::InnerBackend as Backend>::Device::default();
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        fastrand::seed(
            config
                .seed
                .wrapping_add((actor_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );

        let mut actor = actor_factory(&device);

        // Block until the initial weights are published.
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            if let Some(bytes) = slot.latest() {
                if let Ok(record) = recorder.load(bytes, &device) {
                    actor = actor.load_record(record);
                    break;
                }
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        let mut inference_actor: A::InnerModule = actor.valid();

        let mut env = env_factory(actor_id, config.n_envs_per_actor);
        let n_envs = env.num_envs();
        let obs_size = env.obs_size();
        let goal_size = env.goal_size();
        let action_dim = env.action_dim();
        let (low, high) = env.action_bounds();
        let input_size = obs_size + goal_size;
        let horizon = env.max_episode_steps();

        let mut obs_buffer = vec![0.0f32; n_envs * obs_size];
        let mut achieved_buffer = vec![0.0f32; n_envs * goal_size];
        let mut desired_buffer = vec![0.0f32; n_envs * goal_size];
        let mut next_obs_buffer = vec![0.0f32; n_envs * obs_size];
        let mut next_achieved_buffer = vec![0.0f32; n_envs * goal_size];
        let mut input_buffer = vec![0.0f32; n_envs * input_size];

        let mut assemblers: Vec<GoalEpisode> = (0..n_envs)
            .map(|_| GoalEpisode::with_capacity(horizon))
            .collect();
        let mut tracker = EpisodeTracker::new(n_envs);
        let mut last_version = slot.version();
        let mut local_steps = 0usize;

        while !shutdown.load(Ordering::Relaxed) {
            // Pick up newly published weights on the polling cadence.
            if local_steps % config.model_update_freq == 0 {
                let current_version = slot.version();
                if current_version > last_version {
                    if let Some(bytes) = slot.latest() {
                        if let Ok(record) = recorder.load(bytes, &device) {
                            actor = actor.load_record(record);
                            inference_actor = actor.valid();
                            last_version = current_version;
                        }
                    }
                }
            }

            env.write_observations(&mut obs_buffer);
            env.write_achieved_goals(&mut achieved_buffer);
            env.write_desired_goals(&mut desired_buffer);

            let actions: Vec<f32> =
                if env_steps.load(Ordering::Relaxed) < config.warmup_env_steps {
                    // Uniform random warmup.
                    (0..n_envs * action_dim)
                        .map(|_| low + fastrand::f32() * (high - low))
                        .collect()
                } else {
                    for i in 0..n_envs {
                        let base = i * input_size;
                        input_buffer[base..base + obs_size]
                            .copy_from_slice(&obs_buffer[i * obs_size..(i + 1) * obs_size]);
                        input_buffer[base + obs_size..base + input_size].copy_from_slice(
                            &desired_buffer[i * goal_size..(i + 1) * goal_size],
                        );
                    }

                    let input = Tensor::<B::InnerBackend, 1>::from_floats(
                        input_buffer.as_slice(),
                        &inner_device,
                    )
                    .reshape([n_envs, input_size]);
                    let output = inference_actor.forward(input);

                    let action_tensor = match exploration {
                        Exploration::PolicySample => output.sample().0,
                        Exploration::GaussianNoise { sigma } => {
                            let greedy = output.deterministic_actions();
                            let noise: Tensor<B::InnerBackend, 2> = Tensor::random(
                                greedy.dims(),
                                Distribution::Normal(0.0, sigma as f64),
                                &inner_device,
                            );
                            (greedy + noise).clamp(low, high)
                        }
                    };

                    action_tensor
                        .into_data()
                        .to_vec::<f32>()
                        .expect("Failed to copy actions to host")
                };

            let result = env.step(&actions);
            env.write_observations(&mut next_obs_buffer);
            env.write_achieved_goals(&mut next_achieved_buffer);

            for i in 0..n_envs {
                tracker.add_step(i, result.rewards[i]);
                assemblers[i].push(GoalTransition {
                    observation: obs_buffer[i * obs_size..(i + 1) * obs_size].to_vec(),
                    achieved_goal: achieved_buffer[i * goal_size..(i + 1) * goal_size]
                        .to_vec(),
                    desired_goal: desired_buffer[i * goal_size..(i + 1) * goal_size].to_vec(),
                    action: actions[i * action_dim..(i + 1) * action_dim].to_vec(),
                    reward: result.rewards[i],
                    next_observation: next_obs_buffer[i * obs_size..(i + 1) * obs_size]
                        .to_vec(),
                    next_achieved_goal: next_achieved_buffer
                        [i * goal_size..(i + 1) * goal_size]
                        .to_vec(),
                    terminal: result.terminals[i],
                    truncated: result.truncations[i],
                });
            }

            let done_indices: Vec<usize> = (0..n_envs).filter(|&i| result.done(i)).collect();
            if !done_indices.is_empty() {
                for &i in &done_indices {
                    let episode = std::mem::replace(
                        &mut assemblers[i],
                        GoalEpisode::with_capacity(horizon),
                    );
                    buffer.push_episode(episode);

                    let outcome =
                        EpisodeOutcome::from_flags(result.terminals[i], result.truncations[i]);
                    let finished = tracker.finish(i, result.successes[i], outcome);
                    let _ = episode_tx.send(finished);
                }
                env.reset_envs(&done_indices);
            }

            env_steps.fetch_add(n_envs, Ordering::Relaxed);
            local_steps += 1;
        }
    }

    /// Learner thread: samples relabeled batches and applies the update rule
    /// with update-to-data pacing.
    #[allow(clippy::too_many_arguments)]
    fn learner_thread<A, C, R, OA, OC>(
        config: &TrainerConfig,
        mut rule: R,
        mut models: UpdateModels<A, C>,
        mut optimizers: Optimizers<OA, OC>,
        reward_fn: GoalRewardFn,
        mut checkpointer: Option<Checkpointer>,
        success_bits: Arc<AtomicU32>,
        slot: SharedPolicySlot,
        buffer: Arc<HerReplayBuffer>,
        shutdown: Arc<AtomicBool>,
        train_steps: Arc<AtomicUsize>,
        env_steps: Arc<AtomicUsize>,
        shared_loss: Arc<Mutex<LossInfo>>,
    ) -> (A, C)
    where
        A: GoalActorTraining<B>,
        A::InnerModule: GoalActor<B::InnerBackend>,
        A::Record: Send + 'static,
        C: GoalCriticTraining<B>,
        R: UpdateRule<B, A, C>,
        OA: Optimizer<A, B>,
        OC: Optimizer<C, B>,
    {
        let device = B::Device::default();
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let mut gradient_step = 0usize;
        let sleep_duration = Duration::from_millis(config.sleep_when_ahead_ms);

        while !shutdown.load(Ordering::Relaxed) {
            if !buffer.is_training_ready() {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }

            // UTD pacing against global env steps.
            let current_env_steps = env_steps.load(Ordering::Relaxed);
            let target_gradient_steps =
                (current_env_steps as f32 * config.utd_ratio) as usize;

            if gradient_step >= target_gradient_steps && target_gradient_steps > 0 {
                std::thread::sleep(sleep_duration);
                continue;
            }

            while gradient_step < target_gradient_steps {
                let batch = match buffer.sample_batch(&reward_fn) {
                    Some(batch) => batch,
                    None => break,
                };

                let (updated, info) = rule.train_step(models, &batch, &mut optimizers, &device);
                models = updated;

                {
                    *shared_loss.lock() = info;
                }

                gradient_step += 1;

                if gradient_step % config.model_update_freq == 0 {
                    if let Ok(bytes) = recorder.record(models.actor.clone().into_record(), ()) {
                        slot.publish(bytes);
                    }
                }

                if let Some(cp) = checkpointer.as_mut() {
                    let success = f32::from_bits(success_bits.load(Ordering::Relaxed));
                    if let Err(e) = cp.maybe_save(gradient_step, &models.actor, Some(success)) {
                        println!("Checkpoint save failed: {}", e);
                    }
                }

                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
            }

            train_steps.store(gradient_step, Ordering::Relaxed);
        }

        // Final publish so late evaluators see the last weights.
        if let Ok(bytes) = recorder.record(models.actor.clone().into_record(), ()) {
            slot.publish(bytes);
        }
        train_steps.store(gradient_step, Ordering::Relaxed);

        (models.actor, models.critic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{
        DdpgConfig, DdpgRule, MlpActor, MlpActorConfig, MlpCritic, MlpCriticConfig, SacConfig,
        SacRule,
    };
    use crate::environment::test_env::PointEnv;
    use burn::backend::{Autodiff, NdArray};

    type B = Autodiff<NdArray<f32>>;

    // PointEnv: obs [position, progress], goal [target position], 1 action dim.
    const INPUT: usize = 3;
    const ACTIONS: usize = 1;

    fn quick_config(max_steps: usize) -> TrainerConfig {
        TrainerConfig::quick()
            .with_max_env_steps(max_steps)
            .with_warmup_env_steps(100)
            .with_log_interval_secs(60.0)
    }

    #[test]
    fn test_ddpg_training_run_completes() {
        let trainer = OffPolicyTrainer::<B>::new(quick_config(600));
        let device = Default::default();

        let actor = MlpActorConfig::new(INPUT, ACTIONS)
            .with_hidden_sizes((16, 16))
            .init(&device);
        let critic = MlpCriticConfig::new(INPUT, ACTIONS)
            .with_hidden_sizes((16, 16))
            .init(&device);
        let (actor_opt, critic_opt) = trainer.create_optimizers::<MlpActor<B>, MlpCritic<B>>();

        let outcome = trainer.run(
            DdpgRule::new(DdpgConfig::new()),
            |device: &<B as Backend>::Device| {
                MlpActorConfig::new(INPUT, ACTIONS)
                    .with_hidden_sizes((16, 16))
                    .init(device)
            },
            actor,
            critic,
            |_actor_id, n_envs| PointEnv::new(n_envs, 40),
            actor_opt,
            critic_opt,
            |_stats| {},
        );

        assert!(outcome.stats.env_steps >= 600);
        assert!(outcome.stats.episodes > 0);
        assert!(outcome.stats.train_steps > 0);
    }

    #[test]
    fn test_sac_training_run_completes() {
        let trainer = OffPolicyTrainer::<B>::new(quick_config(600));
        let device = Default::default();

        let actor = MlpActorConfig::new(INPUT, ACTIONS)
            .with_hidden_sizes((16, 16))
            .stochastic()
            .init(&device);
        let critic = MlpCriticConfig::new(INPUT, ACTIONS)
            .with_hidden_sizes((16, 16))
            .twin()
            .init(&device);
        let (actor_opt, critic_opt) = trainer.create_optimizers::<MlpActor<B>, MlpCritic<B>>();

        let outcome = trainer.run(
            SacRule::new(SacConfig::new(), ACTIONS),
            |device: &<B as Backend>::Device| {
                MlpActorConfig::new(INPUT, ACTIONS)
                    .with_hidden_sizes((16, 16))
                    .stochastic()
                    .init(device)
            },
            actor,
            critic,
            |_actor_id, n_envs| PointEnv::new(n_envs, 40),
            actor_opt,
            critic_opt,
            |_stats| {},
        );

        assert!(outcome.stats.env_steps >= 600);
        assert!(outcome.stats.episodes > 0);
    }

    #[test]
    #[should_panic(expected = "stochastic")]
    fn test_sac_rejects_deterministic_actor() {
        let trainer = OffPolicyTrainer::<B>::new(quick_config(200));
        let device = Default::default();

        // Deterministic actor with a SAC rule must be rejected up front.
        let actor = MlpActorConfig::new(INPUT, ACTIONS)
            .with_hidden_sizes((8, 8))
            .init(&device);
        let critic = MlpCriticConfig::new(INPUT, ACTIONS)
            .with_hidden_sizes((8, 8))
            .twin()
            .init(&device);
        let (actor_opt, critic_opt) = trainer.create_optimizers::<MlpActor<B>, MlpCritic<B>>();

        let _ = trainer.run(
            SacRule::new(SacConfig::new(), ACTIONS),
            |device: &<B as Backend>::Device| {
                MlpActorConfig::new(INPUT, ACTIONS)
                    .with_hidden_sizes((8, 8))
                    .init(device)
            },
            actor,
            critic,
            |_actor_id, n_envs| PointEnv::new(n_envs, 40),
            actor_opt,
            critic_opt,
            |_stats| {},
        );
    }
}
